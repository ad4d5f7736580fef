//! Lustre Provisioner
//!
//! Serves the file-system validation, provisioning and SKU catalog API over
//! REST, backed by the in-memory control plane.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lustre_provisioner::{
    load_catalog_file, ApiServer, ApiServerConfig, IdentityRequirement, InMemoryBackendConfig,
    InMemoryLustreBackend, LustreService, ServiceConfig, ValidationPolicy,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Lustre Provisioner - managed Lustre configuration validation and SKU catalog API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REST API bind address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8090")]
    api_addr: String,

    /// Subscription all operations run against
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", default_value = lustre_provisioner::controlplane::DEFAULT_SUBSCRIPTION)]
    subscription: String,

    /// Require a user-assigned identity when custom encryption is enabled
    #[arg(long, env = "REQUIRE_ENCRYPTION_IDENTITY")]
    require_encryption_identity: bool,

    /// JSON file holding the raw SKU catalog (array of SKU records)
    #[arg(long, env = "SKU_CATALOG_FILE")]
    catalog_file: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args)?;

    info!("Starting Lustre Provisioner");
    info!("  Version: {}", lustre_provisioner::VERSION);
    info!("  REST API: {}", args.api_addr);
    info!("  Subscription: {}", args.subscription);

    let policy = ValidationPolicy {
        encryption_identity: if args.require_encryption_identity {
            IdentityRequirement::RequiredWhenEncrypted
        } else {
            IdentityRequirement::Optional
        },
    };
    info!("  Encryption identity: {:?}", policy.encryption_identity);

    // Build backend
    let mut backend_config = InMemoryBackendConfig {
        subscription: args.subscription.clone(),
        ..Default::default()
    };
    if let Some(path) = &args.catalog_file {
        backend_config.catalog = load_catalog_file(path)
            .with_context(|| format!("loading SKU catalog from {}", path))?;
    }
    let backend = Arc::new(InMemoryLustreBackend::new(backend_config));

    // Create service
    let service_config = ServiceConfig {
        policy,
        default_subscription: args.subscription.clone(),
    };
    let service = LustreService::with_in_memory_backend(service_config, backend)?;

    // Create and run API server
    let api_config = ApiServerConfig {
        rest_addr: args
            .api_addr
            .parse()
            .with_context(|| format!("invalid REST API address {}", args.api_addr))?,
        request_timeout_secs: args.request_timeout_secs,
    };

    let api_server = ApiServer::new(api_config, service);
    api_server.run().await?;

    info!("Lustre Provisioner shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower=warn".parse()?)
        .add_directive("tower_http=info".parse()?);

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
