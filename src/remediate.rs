// Remediator: reads the audit CSV and fixes unencrypted, non-public buckets.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use crate::common::AuditRecord;
use crate::policy::PolicyTemplate;
use crate::s3::Client;
use csv::Trim;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tracing::{
    info,
    warn,
};

/// Read the audit CSV produced by the auditor.
///
/// The header row is skipped and fields are trimmed. Boolean fields are
/// parsed permissively: anything that fails to parse counts as `false`.
pub fn read_audit_file(path: &Path) -> Result<Vec<AuditRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.context("Failed to read audit row")?;

        let Some(bucket) = row.get(0) else {
            continue;
        };

        records.push(AuditRecord {
            bucket:    bucket.to_string(),
            encrypted: parse_flag(row.get(1)),
            public:    parse_flag(row.get(2)),
        });
    }

    Ok(records)
}

/// Select the buckets that should be remediated.
///
/// A bucket is selected if and only if it was audited as both unencrypted
/// and non-public. Public buckets need a manual remediation path and are
/// left alone.
pub fn select_targets(records: Vec<AuditRecord>) -> Vec<AuditRecord> {
    records.into_iter()
        .filter(|record| record.needs_remediation())
        .collect()
}

/// Remediate the selected buckets concurrently.
///
/// One task per bucket, bounded by `concurrency` permits, each applying the
/// default encryption rule and then the bucket policy. The first encryption
/// failure (or encryption timeout) aborts the whole run, abandoning any
/// in-flight tasks; policy failures and timeouts are logged and skipped.
pub async fn run(
    client: Client,
    targets: Vec<AuditRecord>,
    template: PolicyTemplate,
    concurrency: usize,
    timeout: Duration,
) -> Result<()> {
    if targets.is_empty() {
        info!("No buckets need remediation");

        return Ok(());
    }

    let template  = Arc::new(template);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for record in targets {
        let client    = client.clone();
        let template  = Arc::clone(&template);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned()
                .await
                .context("Failed to acquire a remediation permit")?;

            remediate_bucket(&client, &template, &record.bucket, timeout).await
        });
    }

    // Dropping the JoinSet on the error return below aborts whatever is
    // still in flight.
    while let Some(result) = tasks.join_next().await {
        result.context("Remediation task panicked")??;
    }

    Ok(())
}

// Apply the default encryption rule, then the bucket policy, each under its
// own deadline. An encryption failure or timeout is returned to the caller;
// a policy failure or timeout only logs, leaving the bucket encrypted but
// without the policy.
async fn remediate_bucket(
    client: &Client,
    template: &PolicyTemplate,
    bucket: &str,
    timeout: Duration,
) -> Result<()> {
    time::timeout(timeout, client.put_default_encryption(bucket))
        .await
        .with_context(|| format!("Encryption apply timed out for '{bucket}'"))?
        .with_context(|| format!("Failed to apply default encryption to '{bucket}'"))?;

    info!("Encrypted '{}'", bucket);

    let policy = time::timeout(
        timeout,
        client.put_bucket_policy(bucket, &template.render(bucket)),
    ).await;

    match policy {
        Ok(Ok(())) => info!("Applied encryption policy to '{}'", bucket),
        Ok(Err(err)) => {
            warn!("Failed to apply encryption policy to '{}': {:?}", bucket, err);
        },
        Err(_) => {
            warn!("Policy apply timed out for '{}' after {:?}", bucket, timeout);
        },
    }

    Ok(())
}

// Failed boolean parses count as false.
fn parse_flag(field: Option<&str>) -> bool {
    field
        .and_then(|f| f.trim().parse().ok())
        .unwrap_or(false)
}
