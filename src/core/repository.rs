use async_trait::async_trait;

use crate::core::error::RegistryError;
use crate::core::models::Device;

/// Persistence seam for device records.
///
/// Enumeration is paged: `scan_page` returns records strictly after `cursor`
/// (repository-defined ordering, stable while the collection is unchanged)
/// together with the cursor for the next page.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Device>, RegistryError>;

    /// Insert a batch of devices in a single transaction. Either every
    /// device in the batch is persisted or none are.
    async fn insert_batch(&self, devices: Vec<Device>) -> Result<(), RegistryError>;

    /// Delete a record by id. Deleting an id that no longer exists is
    /// `NotFound`, so two racing deletions cannot both report success.
    async fn delete(&self, id: &str) -> Result<(), RegistryError>;

    async fn scan_page(
        &self,
        cursor: Option<i64>,
        limit: u32,
    ) -> Result<Vec<(i64, Device)>, RegistryError>;
}
