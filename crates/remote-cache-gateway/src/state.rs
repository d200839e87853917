//! Application state

use crate::auth::TokenAuthenticator;
use crate::config::GatewayConfig;
use crate::error::ConfigError;
use crate::presign::{S3UrlSigner, UrlSigner};
use std::sync::Arc;
use tracing::info;

/// Read-only state shared across handlers, built once at startup
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Team token verifier
    pub authenticator: TokenAuthenticator,
    /// Presigned URL issuer
    pub signer: Arc<dyn UrlSigner>,
}

impl AppState {
    /// Create the application state.
    ///
    /// Fails on the first missing required setting, so request handling never
    /// sees a configuration fault.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let authenticator = TokenAuthenticator::new(config.require_jwt_secret()?);

        let store = config.object_store()?;
        let signer = S3UrlSigner::from_config(&store)?;
        match &store.endpoint {
            Some(endpoint) => info!(bucket = %store.bucket, %endpoint, "Object store configured"),
            None => info!(bucket = %store.bucket, region = %store.region, "Object store configured"),
        }

        Ok(Self::with_signer(config, authenticator, Arc::new(signer)))
    }

    /// Assemble state from already-built collaborators
    pub fn with_signer(
        config: GatewayConfig,
        authenticator: TokenAuthenticator,
        signer: Arc<dyn UrlSigner>,
    ) -> Self {
        Self {
            config,
            authenticator,
            signer,
        }
    }
}
