use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use copydata::config::{Config, EnvironmentConfig};
use copydata::engine::Replicator;
use copydata::output::{format_report, OutputFormat};
use copydata::store::dynamodb::{create_client, check_connection, DynamoDbStore};
use copydata_core::catalog;
use copydata_core::replication::ReplicationPlan;

/// copy-data - Replace a stage's tables with a sanitized copy of another stage's
#[derive(Parser, Debug)]
#[command(name = "copy-data")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Stage whose tables are read (e.g. prod)
    #[arg(long, env = "COPY_DATA_SOURCE_STAGE")]
    source_stage: String,

    /// Stage whose tables are cleared and rewritten (e.g. dev)
    #[arg(long, env = "COPY_DATA_TARGET_STAGE")]
    target_stage: String,

    /// AWS profile for the source account
    #[arg(long, env = "COPY_DATA_SOURCE_PROFILE")]
    source_profile: Option<String>,

    /// AWS profile for the target account
    #[arg(long, env = "COPY_DATA_TARGET_PROFILE")]
    target_profile: Option<String>,

    /// AWS region of both environments
    #[arg(long, default_value = "us-east-1", env = "AWS_REGION")]
    region: String,

    /// Custom DynamoDB endpoint for the source (e.g. local DynamoDB)
    #[arg(long, env = "COPY_DATA_SOURCE_ENDPOINT_URL")]
    source_endpoint_url: Option<String>,

    /// Custom DynamoDB endpoint for the target
    #[arg(long, env = "COPY_DATA_TARGET_ENDPOINT_URL")]
    target_endpoint_url: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t, env = "COPY_DATA_FORMAT")]
    format: OutputFormat,
}

impl Cli {
    fn source(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            stage: self.source_stage.clone(),
            profile: self.source_profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.source_endpoint_url.clone(),
        }
    }

    fn target(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            stage: self.target_stage.clone(),
            profile: self.target_profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.target_endpoint_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copydata=info,copydata_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let source = cli.source();
    let target = cli.target();

    if source.is_same_as(&target) {
        bail!(
            "Source and target are the same environment ({}), refusing to overwrite it",
            source.target_display()
        );
    }

    let plan = ReplicationPlan::new(catalog::table_specs(&source.stage, &target.stage))
        .context("Invalid replication plan")?;
    let registry = catalog::sanitizers(&source.stage);

    tracing::info!(
        source = %source.target_display(),
        target = %target.target_display(),
        tables = plan.len(),
        "Copying data"
    );

    let source_client = create_client(&source).await;
    check_connection(&source_client)
        .await
        .with_context(|| format!("Cannot reach source {}", source.target_display()))?;
    let target_client = create_client(&target).await;
    check_connection(&target_client)
        .await
        .with_context(|| format!("Cannot reach target {}", target.target_display()))?;

    let replicator = Replicator::new(
        Arc::new(DynamoDbStore::new(source_client).with_page_size(config.page_size)),
        Arc::new(DynamoDbStore::new(target_client).with_page_size(config.page_size)),
        registry,
        config.replication_options(),
    );

    let report = tokio::select! {
        report = replicator.replicate(&plan) => report,
        received = shutdown_signal() => {
            bail!("Received {received}, replication aborted; target tables may be incomplete");
        }
    };

    println!("{}", format_report(&report, cli.format));

    if !report.is_success() {
        let totals = report.totals();
        bail!(
            "Replication finished with errors (failed tables: {}, item failures: {})",
            totals.failed_tables,
            totals.item_failures
        );
    }
    Ok(())
}

/// Resolves with the name of the first termination signal received.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Received Ctrl+C, aborting...");
            "Ctrl+C"
        }
        _ = terminate => {
            tracing::warn!("Received SIGTERM, aborting...");
            "SIGTERM"
        }
    }
}
