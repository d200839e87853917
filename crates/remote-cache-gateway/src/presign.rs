//! Presigned object store URLs
//!
//! The [`UrlSigner`] trait is the only seam the router sees. [`S3UrlSigner`]
//! computes SigV4 query signatures locally with rust-s3; no request is sent
//! to the object store.

use std::collections::HashMap;
use std::fmt;

use crate::auth::TenantId;
use crate::config::ObjectStoreConfig;
use crate::error::{ConfigError, SigningError};

/// Query parameter carrying the owning team, for downstream auditing
pub const TENANT_QUERY_PARAM: &str = "teamId";

/// Operation a presigned URL authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOperation {
    /// Download an artifact
    Read,
    /// Upload an artifact
    Write,
}

impl ArtifactOperation {
    /// Map a preflight-hint method to an operation. Only `GET` and `PUT` qualify.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Self::Read),
            "PUT" => Some(Self::Write),
            _ => None,
        }
    }

    pub fn as_method(&self) -> &'static str {
        match self {
            Self::Read => "GET",
            Self::Write => "PUT",
        }
    }
}

impl fmt::Display for ArtifactOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method())
    }
}

/// Produces time-limited URLs for a single object.
///
/// The caller has already authorized `key`; `tenant` is only embedded.
#[async_trait::async_trait]
pub trait UrlSigner: Send + Sync {
    async fn sign(
        &self,
        operation: ArtifactOperation,
        key: &str,
        tenant: &TenantId,
        expiry_secs: u32,
    ) -> Result<String, SigningError>;
}

/// rust-s3 backed signer scoped to one bucket and region
pub struct S3UrlSigner {
    bucket: s3::Bucket,
}

impl S3UrlSigner {
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// Build the bucket handle from resolved settings.
    ///
    /// Without an endpoint override URLs are virtual-hosted:
    /// `https://<bucket>.s3.<region>.amazonaws.com/<key>`.
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", config.region));
        let region = s3::Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let credentials = s3::creds::Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            config.session_token.as_deref(),
            config.session_token.as_deref(),
            None,
        )
        .map_err(|e| ConfigError::ObjectStore(format!("credentials: {e}")))?;

        let bucket = s3::Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| ConfigError::ObjectStore(format!("bucket: {e}")))?;

        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self::new(*bucket))
    }
}

#[async_trait::async_trait]
impl UrlSigner for S3UrlSigner {
    async fn sign(
        &self,
        operation: ArtifactOperation,
        key: &str,
        tenant: &TenantId,
        expiry_secs: u32,
    ) -> Result<String, SigningError> {
        let mut queries = HashMap::new();
        queries.insert(TENANT_QUERY_PARAM.to_string(), tenant.as_str().to_string());

        let result = match operation {
            ArtifactOperation::Read => {
                self.bucket
                    .presign_get(key, expiry_secs, Some(queries))
                    .await
            }
            ArtifactOperation::Write => {
                self.bucket
                    .presign_put(key, expiry_secs, None, Some(queries))
                    .await
            }
        };

        result.map_err(|e| SigningError::Presign {
            operation: operation.as_method(),
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}
