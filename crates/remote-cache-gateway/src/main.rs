//! Remote cache gateway - presigned URL broker for team build artifacts

use clap::Parser;
use remote_cache_gateway::{run_server_with_shutdown, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "remote-cache-gateway")]
#[command(about = "Team-scoped build artifact cache gateway")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "CACHE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "CACHE_PORT")]
    port: u16,

    /// Shared secret for team token verification
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// AWS access key id used for presigning
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    aws_access_key_id: Option<String>,

    /// AWS secret access key used for presigning
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    aws_secret_access_key: Option<String>,

    /// AWS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    aws_session_token: Option<String>,

    /// Object store region
    #[arg(long, env = "AWS_REGION")]
    aws_region: Option<String>,

    /// Artifact bucket
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3-compatible endpoint (e.g. http://localhost:9000 for MinIO)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short, long, env = "CACHE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("remote_cache_gateway={},tower_http=debug", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting remote cache gateway on {}:{}", args.host, args.port);

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        jwt_secret: args.jwt_secret,
        aws_access_key_id: args.aws_access_key_id,
        aws_secret_access_key: args.aws_secret_access_key,
        aws_session_token: args.aws_session_token,
        aws_region: args.aws_region,
        s3_bucket: args.s3_bucket,
        s3_endpoint: args.s3_endpoint,
        ..Default::default()
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    run_server_with_shutdown(config, shutdown).await
}
