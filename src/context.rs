use std::sync::Arc;

use crate::assets::AssetStore;
use crate::config::AppConfig;
use crate::core::repository::DeviceRepository;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub repo: Arc<dyn DeviceRepository>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn DeviceRepository>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            assets,
        }
    }
}
