//! Photo asset storage.
//!
//! A device's photo is an object in a bucket, referenced only by the URL
//! stored on the record. `AssetNamespace` decides whether a URL points into
//! our bucket/prefix at all; foreign URLs (externally hosted images) are
//! never touched.

mod s3;
mod simulated;

pub use s3::S3AssetStore;
pub use simulated::SimulatedAssetStore;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;

/// The bucket/region/prefix convention that marks a photo URL as ours.
#[derive(Debug, Clone)]
pub struct AssetNamespace {
    bucket: String,
    region: String,
    prefix: String,
}

impl AssetNamespace {
    pub fn new(bucket: &str, region: &str, prefix: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            region: region.to_string(),
            prefix: prefix.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.bucket, &config.region, &config.photo_prefix)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Return the storage key for `url` if it is an owned asset URL.
    ///
    /// A URL is owned iff it starts with
    /// `https://{bucket}.s3.{region}.amazonaws.com/{prefix}/`; the key is
    /// everything after the first `.amazonaws.com/`.
    pub fn owned_key(&self, url: &str) -> Option<String> {
        let owned_prefix = format!(
            "https://{}.s3.{}.amazonaws.com/{}/",
            self.bucket, self.region, self.prefix
        );
        if !url.starts_with(&owned_prefix) {
            return None;
        }
        url.split_once(".amazonaws.com/")
            .map(|(_, key)| key.to_string())
    }
}

/// Object-storage seam. Implementations delete by key within the bucket
/// described by their namespace.
#[async_trait]
pub trait AssetStore: Send + Sync {
    fn namespace(&self) -> &AssetNamespace;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Pick the asset backend from config: real S3, or the in-memory store
/// when running in simulation mode.
pub async fn get_store(config: &AppConfig) -> Arc<dyn AssetStore> {
    let namespace = AssetNamespace::from_config(config);

    if config.simulation {
        Arc::new(SimulatedAssetStore::new(namespace))
    } else {
        Arc::new(S3AssetStore::new(namespace, &config.region).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace() -> AssetNamespace {
        AssetNamespace::new("devphotos", "us-east-1", "device-photos")
    }

    #[test]
    fn owned_url_yields_key() {
        let key = namespace()
            .owned_key("https://devphotos.s3.us-east-1.amazonaws.com/device-photos/abc.jpg");
        assert_eq!(key.as_deref(), Some("device-photos/abc.jpg"));
    }

    #[test]
    fn foreign_host_is_not_owned() {
        assert_eq!(namespace().owned_key("https://other.cdn.example/x.jpg"), None);
    }

    #[test]
    fn wrong_bucket_is_not_owned() {
        let url = "https://attacker.s3.us-east-1.amazonaws.com/device-photos/abc.jpg";
        assert_eq!(namespace().owned_key(url), None);
    }

    #[test]
    fn wrong_prefix_is_not_owned() {
        let url = "https://devphotos.s3.us-east-1.amazonaws.com/uploads/abc.jpg";
        assert_eq!(namespace().owned_key(url), None);
    }

    #[test]
    fn wrong_region_is_not_owned() {
        let url = "https://devphotos.s3.eu-west-2.amazonaws.com/device-photos/abc.jpg";
        assert_eq!(namespace().owned_key(url), None);
    }

    #[test]
    fn nested_key_is_preserved() {
        let key = namespace()
            .owned_key("https://devphotos.s3.us-east-1.amazonaws.com/device-photos/2026/a b.jpg");
        assert_eq!(key.as_deref(), Some("device-photos/2026/a b.jpg"));
    }
}
