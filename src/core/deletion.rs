//! Device deletion with photo asset cleanup.

use crate::assets::AssetStore;
use crate::core::error::RegistryError;
use crate::core::repository::DeviceRepository;

/// Delete a device record, removing its photo from the asset store first
/// when the photo URL belongs to our namespace.
///
/// Ordering matters: the asset is deleted before the record, and a failed
/// asset deletion aborts the workflow so a surviving record never points at
/// a deleted object. Externally hosted photo URLs are left alone.
pub async fn delete_device(
    repo: &dyn DeviceRepository,
    assets: &dyn AssetStore,
    id: &str,
) -> Result<(), RegistryError> {
    let Some(device) = repo.get(id).await? else {
        return Err(RegistryError::NotFound);
    };

    if let Some(photo) = &device.photo {
        if let Some(key) = assets.namespace().owned_key(photo) {
            assets
                .delete(&key)
                .await
                .map_err(RegistryError::AssetDeletionFailure)?;
            tracing::info!(id, key = %key, "deleted owned photo asset");
        }
    }

    repo.delete(id).await?;
    tracing::info!(id, "deleted device record");

    Ok(())
}
