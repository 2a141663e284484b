// sse-remediate: reads the audit CSV and applies default encryption plus a
// bucket policy to buckets found unencrypted and non-public.
#![forbid(unsafe_code)]
use anyhow::Result;
use sse_audit::{
    audit,
    cli,
    policy,
    remediate,
    s3,
};
use sse_audit::policy::PolicyTemplate;
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

    let matches = cli::parse_remediate_args();
    let config  = cli::client_config(&matches);

    let concurrency = config.concurrency;
    let timeout     = config.timeout;

    let records = remediate::read_audit_file(Path::new(audit::AUDIT_FILE))?;
    let targets = remediate::select_targets(records);

    if targets.is_empty() {
        info!("No buckets need remediation");

        return Ok(());
    }

    info!("Remediating {} buckets", targets.len());

    let template = PolicyTemplate::load(Path::new(policy::POLICY_FILE))?;
    let client   = s3::Client::new(config).await;

    remediate::run(client, targets, template, concurrency, timeout).await
}
