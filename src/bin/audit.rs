// sse-audit: audits S3 buckets for default encryption and public-read
// exposure, writing one CSV row per bucket.
#![forbid(unsafe_code)]
use anyhow::Result;
use sse_audit::{
    audit,
    cli,
    s3,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = cli::parse_audit_args();
    let config  = cli::client_config(&matches);

    let concurrency = config.concurrency;
    let timeout     = config.timeout;

    let client = s3::Client::new(config).await;

    let written = audit::run(
        client,
        Path::new(audit::AUDIT_FILE),
        concurrency,
        timeout,
    ).await?;

    info!("Wrote {} audit records to '{}'", written, audit::AUDIT_FILE);

    Ok(())
}
