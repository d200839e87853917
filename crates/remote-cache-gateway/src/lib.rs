//! # Remote Cache Gateway
//!
//! Stateless edge handler for a team-scoped build artifact cache.
//!
//! The gateway never touches artifact bytes. It authenticates a team token,
//! namespaces the requested hash under the team (`<teamId>/<hash>`) and hands
//! back a presigned object store URL the client uses directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               Build tool / browser                  │
//! └─────────────────────────┬───────────────────────────┘
//!                           │  OPTIONS /v8/artifacts/{hash}
//! ┌─────────────────────────▼───────────────────────────┐
//! │                 Request Router                      │
//! │   prefix check → status / events → artifact grant   │
//! ├──────────────────────────┬──────────────────────────┤
//! │   Token Authenticator    │    URL Signing Gateway   │
//! │   (HMAC JWT, teamId)     │    (SigV4 presigning)    │
//! └──────────────────────────┴──────────────────────────┘
//!                           │  location: <presigned URL>
//! ┌─────────────────────────▼───────────────────────────┐
//! │                 S3 object store                     │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod presign;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{ApiError, ConfigError, SigningError};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
