//! Gateway configuration

use crate::error::ConfigError;

/// Path prefix every cache route lives under
pub const API_PREFIX: &str = "/v8/artifacts";

/// Lifetime of an issued presigned URL (seconds)
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 3600;

/// Gateway server configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Shared secret for team token verification
    pub jwt_secret: Option<String>,
    /// AWS access key id used for presigning
    pub aws_access_key_id: Option<String>,
    /// AWS secret access key used for presigning
    pub aws_secret_access_key: Option<String>,
    /// Optional AWS session token (temporary credentials)
    pub aws_session_token: Option<String>,
    /// Object store region
    pub aws_region: Option<String>,
    /// Bucket holding the artifacts
    pub s3_bucket: Option<String>,
    /// S3-compatible endpoint override (MinIO, R2, ...). Switches to path-style URLs.
    pub s3_endpoint: Option<String>,
    /// Presigned URL expiry (seconds)
    pub presign_expiry_secs: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            aws_region: None,
            s3_bucket: None,
            s3_endpoint: None,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// JWT secret, or a fault naming `JWT_SECRET`
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        require(&self.jwt_secret, "JWT_SECRET")
    }

    /// Collect the object store settings, failing on the first missing value.
    pub fn object_store(&self) -> Result<ObjectStoreConfig, ConfigError> {
        Ok(ObjectStoreConfig {
            access_key_id: require(&self.aws_access_key_id, "AWS_ACCESS_KEY_ID")?.to_string(),
            secret_access_key: require(&self.aws_secret_access_key, "AWS_SECRET_ACCESS_KEY")?
                .to_string(),
            session_token: self
                .aws_session_token
                .clone()
                .filter(|token| !token.is_empty()),
            region: require(&self.aws_region, "AWS_REGION")?.to_string(),
            bucket: require(&self.s3_bucket, "S3_BUCKET")?.to_string(),
            endpoint: self.s3_endpoint.clone().filter(|ep| !ep.is_empty()),
        })
    }
}

/// Object store settings resolved from [`GatewayConfig`]
#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
    pub bucket: String,
    pub endpoint: Option<String>,
}

// Empty strings count as absent, same as an unset variable.
fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}
