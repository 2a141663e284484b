// Audit coordinator: classifies buckets and writes the audit CSV.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use crate::common::AuditRecord;
use crate::s3::Client;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tracing::{
    error,
    warn,
};

/// Audit results are written here, in the working directory. The remediator
/// reads the same path.
pub const AUDIT_FILE: &str = "sse-audit-result.csv";

// Header of the audit CSV. The padding after the commas is part of the
// legacy audit format and is kept as the wire contract between the tools.
const CSV_HEADER: [&str; 3] = ["bucket", " encrypted", " public"];

/// Classify one bucket, producing its `AuditRecord`.
///
/// The encryption and public-read checks run concurrently and both must
/// finish before the record is produced; no partial record is ever emitted.
/// If the checks exceed `timeout`, the record fails closed to
/// `(false, false)`.
pub async fn classify_bucket(
    client: &Client,
    bucket: String,
    timeout: Duration,
) -> AuditRecord {
    let checks = async {
        tokio::join!(
            client.is_bucket_encrypted(&bucket),
            client.is_public_read(&bucket),
        )
    };

    match time::timeout(timeout, checks).await {
        Ok((encrypted, public)) => {
            AuditRecord {
                bucket,
                encrypted,
                public,
            }
        },
        Err(_) => {
            warn!("Classification timed out for '{}' after {:?}", bucket, timeout);

            AuditRecord {
                bucket,
                encrypted: false,
                public:    false,
            }
        },
    }
}

/// Create the audit file at `path` and write the CSV header.
pub fn open_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    Ok(writer)
}

/// Run a full audit: enumerate buckets, classify each concurrently, write
/// one row per bucket to `path` in completion order.
///
/// Fan-out is bounded by `concurrency` permits. Rows are written by this
/// task only; workers hand completed records back through the `JoinSet`.
///
/// An enumeration failure is reported but is not an error: the output file
/// is left containing just its header and `Ok(0)` is returned.
pub async fn run(
    client: Client,
    path: &Path,
    concurrency: usize,
    timeout: Duration,
) -> Result<usize> {
    let mut writer = open_writer(path)?;

    let bucket_names = match client.list_buckets().await {
        Ok(names) => names,
        Err(err) => {
            error!("Failed to list buckets: {:?}", err);

            writer.flush().context("Failed to flush audit file")?;

            return Ok(0);
        },
    };

    // Semaphore::new(0) would never hand out a permit.
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks: JoinSet<Result<AuditRecord>> = JoinSet::new();

    for bucket in bucket_names {
        let client    = client.clone();
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned()
                .await
                .context("Failed to acquire a classification permit")?;

            Ok(classify_bucket(&client, bucket, timeout).await)
        });
    }

    let mut written = 0;

    while let Some(record) = tasks.join_next().await {
        let record: AuditRecord = record.context("Classifier task panicked")??;

        writer.serialize(&record)
            .with_context(|| format!("Failed to write record for '{}'", record.bucket))?;

        written += 1;
    }

    writer.flush().context("Failed to flush audit file")?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::Credentials;
    use aws_sdk_s3::client::Client as S3Client;
    use aws_sdk_s3::config::Config as S3Config;
    use aws_smithy_http_client::test_util::{
        NeverClient,
        ReplayEvent,
        StaticReplayClient,
    };
    use aws_smithy_types::body::SdkBody;
    use crate::common::Region;
    use crate::remediate::read_audit_file;
    use pretty_assertions::assert_eq;
    use std::fs;

    enum ResponseType<'a> {
        FromFile(&'a str),
        WithStatus(u16),
    }

    // Create a mock S3 client, returning the data from the specified
    // data_files in order.
    fn mock_client(responses: Vec<ResponseType<'_>>) -> Client {
        let events = responses
            .iter()
            .map(|r| {
                let response = match r {
                    ResponseType::FromFile(file) => {
                        let path = Path::new("test-data").join(file);
                        let data = fs::read_to_string(path).unwrap();

                        http::Response::builder()
                            .status(200)
                            .body(SdkBody::from(data))
                            .unwrap()
                    },
                    ResponseType::WithStatus(status) => {
                        http::Response::builder()
                            .status(*status)
                            .body(SdkBody::from(""))
                            .unwrap()
                    },
                };

                ReplayEvent::new(
                    http::Request::builder()
                        .body(SdkBody::from("request body"))
                        .unwrap(),

                    response,
                )
            })
            .collect();

        let http_client = StaticReplayClient::new(events);

        let creds = Credentials::for_tests_with_session_token();

        let conf = S3Config::builder()
            .behavior_version_latest()
            .credentials_provider(creds)
            .http_client(http_client)
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();

        Client {
            client: S3Client::from_conf(conf),
            region: Region::default().set_region("us-east-1"),
        }
    }

    // Create a mock S3 client whose responses never arrive.
    fn hanging_client() -> Client {
        let creds = Credentials::for_tests_with_session_token();

        let conf = S3Config::builder()
            .behavior_version_latest()
            .credentials_provider(creds)
            .http_client(NeverClient::new())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();

        Client {
            client: S3Client::from_conf(conf),
            region: Region::default().set_region("us-east-1"),
        }
    }

    #[test]
    fn test_header_matches_legacy_format() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("sse-audit-result.csv");

        let mut writer = open_writer(&path).unwrap();
        writer.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();

        assert_eq!(contents, "bucket, encrypted, public\n");
    }

    // One row per record plus the header, and every boolean combination
    // survives the round-trip through the remediator's reader.
    #[test]
    fn test_records_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("sse-audit-result.csv");

        let records = vec![
            AuditRecord { bucket: "ff-bucket".into(), encrypted: false, public: false },
            AuditRecord { bucket: "ft-bucket".into(), encrypted: false, public: true },
            AuditRecord { bucket: "tf-bucket".into(), encrypted: true,  public: false },
            AuditRecord { bucket: "tt-bucket".into(), encrypted: true,  public: true },
        ];

        let mut writer = open_writer(&path).unwrap();

        for record in &records {
            writer.serialize(record).unwrap();
        }

        writer.flush().unwrap();

        let line_count = fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(line_count, records.len() + 1);

        let ret = read_audit_file(&path).unwrap();

        assert_eq!(ret, records);
    }

    // Two enumerated buckets produce exactly two rows plus the header,
    // whatever each bucket's individual check outcomes were. Classification
    // makes at most three calls per bucket (encryption, location, ACL), so
    // six canned responses after the listing are enough at any completion
    // order.
    #[tokio::test]
    async fn test_run_emits_one_row_per_bucket() {
        let client = mock_client(vec![
            ResponseType::FromFile("s3-list-buckets.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
            ResponseType::FromFile("s3-get-bucket-location.xml"),
        ]);

        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("sse-audit-result.csv");

        let written = run(
            client,
            &path,
            1,
            Duration::from_secs(5),
        ).await.unwrap();

        assert_eq!(written, 2);

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(lines.next(), Some("bucket, encrypted, public"));
        assert_eq!(lines.clone().count(), 2);

        let mut buckets: Vec<&str> = lines
            .filter_map(|line| line.split(',').next())
            .collect();
        buckets.sort_unstable();

        assert_eq!(buckets, vec!["a-bucket-name", "another-bucket-name"]);
    }

    // A failed listing still leaves a header-only audit file behind and is
    // not an error.
    #[tokio::test]
    async fn test_run_enumeration_failure_leaves_header_only_file() {
        let client = mock_client(vec![
            ResponseType::WithStatus(403),
        ]);

        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("sse-audit-result.csv");

        let written = run(
            client,
            &path,
            1,
            Duration::from_secs(5),
        ).await.unwrap();

        assert_eq!(written, 0);

        let contents = fs::read_to_string(&path).unwrap();

        assert_eq!(contents, "bucket, encrypted, public\n");
    }

    // A classification that never completes fails closed to (false, false)
    // once the deadline passes.
    #[tokio::test]
    async fn test_classify_bucket_timeout_fails_closed() {
        let client = hanging_client();

        let record = classify_bucket(
            &client,
            "test-bucket".into(),
            Duration::from_millis(50),
        ).await;

        let expected = AuditRecord {
            bucket:    "test-bucket".into(),
            encrypted: false,
            public:    false,
        };

        assert_eq!(record, expected);
    }
}
