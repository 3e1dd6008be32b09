use std::path::PathBuf;

use anyhow::{Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Runtime configuration, layered: defaults, then `devregd.toml`, then
/// `DEVREGD_*` environment variables, then CLI flags.
///
/// The asset-store settings also honor the conventional AWS variable names
/// (`S3_BUCKET_NAME`, `AWS_REGION`, `S3_PHOTO_PREFIX`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http_port: u16,
    pub database_path: PathBuf,
    pub bucket: String,
    pub region: String,
    pub photo_prefix: String,
    pub simulation: bool,
    pub verbose: bool,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            database_path: PathBuf::from("devices.db"),
            bucket: String::new(),
            region: "us-east-1".to_string(),
            photo_prefix: "device-photos".to_string(),
            simulation: false,
            verbose: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn new<A: Serialize>(cli: Option<&A>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("devregd.toml"))
            .merge(Env::prefixed("DEVREGD_"));

        for (var, key) in [
            ("S3_BUCKET_NAME", "bucket"),
            ("AWS_REGION", "region"),
            ("S3_PHOTO_PREFIX", "photo_prefix"),
        ] {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        if let Some(cli) = cli {
            figment = figment.merge(Serialized::defaults(cli));
        }

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.simulation && self.bucket.is_empty() {
            bail!("no asset bucket configured: set S3_BUCKET_NAME (or bucket in devregd.toml)");
        }
        Ok(())
    }
}
