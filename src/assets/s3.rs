use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};

use super::{AssetNamespace, AssetStore};

/// S3-backed asset store with an explicitly constructed client. Credentials
/// come from the SDK's default provider chain (environment, profile,
/// instance role).
pub struct S3AssetStore {
    namespace: AssetNamespace,
    client: aws_sdk_s3::Client,
}

impl S3AssetStore {
    pub async fn new(namespace: AssetNamespace, region: &str) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            namespace,
            client: aws_sdk_s3::Client::new(&shared),
        }
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    fn namespace(&self) -> &AssetNamespace {
        &self.namespace
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(self.namespace.bucket())
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to delete s3 object {key}"))?;

        Ok(())
    }
}
