use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{AssetNamespace, AssetStore};

/// In-memory asset store for simulation mode and tests. Records every
/// deletion; can be told to fail the next calls.
pub struct SimulatedAssetStore {
    namespace: AssetNamespace,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl SimulatedAssetStore {
    pub fn new(namespace: AssetNamespace) -> Self {
        Self {
            namespace,
            deleted: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Keys deleted so far, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Make subsequent delete calls fail with a storage error.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl AssetStore for SimulatedAssetStore {
    fn namespace(&self) -> &AssetNamespace {
        &self.namespace
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(anyhow!("simulated storage failure deleting {key}"));
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
