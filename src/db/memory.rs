use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::core::error::RegistryError;
use crate::core::models::Device;
use crate::core::repository::DeviceRepository;

/// In-memory device repository for simulation mode and tests.
///
/// Enumeration order is insertion order. Read and write failures can be
/// injected to exercise the error paths of the core workflows.
#[derive(Default)]
pub struct MemoryDeviceRepository {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_calls: AtomicUsize,
}

#[derive(Default)]
struct MemoryState {
    seq: i64,
    devices: Vec<(i64, Device)>,
}

impl MemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Number of write operations (inserts or deletes) attempted so far.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DeviceRepository for MemoryDeviceRepository {
    async fn get(&self, id: &str) -> Result<Option<Device>, RegistryError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(RegistryError::StorageReadFailure(anyhow!(
                "simulated read failure"
            )));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .find(|(_, d)| d.id == id)
            .map(|(_, d)| d.clone()))
    }

    async fn insert_batch(&self, devices: Vec<Device>) -> Result<(), RegistryError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(RegistryError::PersistenceFailure(anyhow!(
                "simulated write failure"
            )));
        }
        let mut state = self.state.lock().unwrap();
        for device in devices {
            state.seq += 1;
            let seq = state.seq;
            state.devices.push((seq, device));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(RegistryError::PersistenceFailure(anyhow!(
                "simulated write failure"
            )));
        }
        let mut state = self.state.lock().unwrap();
        let before = state.devices.len();
        state.devices.retain(|(_, d)| d.id != id);
        if state.devices.len() == before {
            return Err(RegistryError::NotFound);
        }
        Ok(())
    }

    async fn scan_page(
        &self,
        cursor: Option<i64>,
        limit: u32,
    ) -> Result<Vec<(i64, Device)>, RegistryError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(RegistryError::StorageReadFailure(anyhow!(
                "simulated read failure"
            )));
        }
        let after = cursor.unwrap_or(0);
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .filter(|(seq, _)| *seq > after)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
