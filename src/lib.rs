// sse-audit: tools for auditing and fixing default encryption on S3 buckets.
#![forbid(unsafe_code)]

/// Audit coordinator: classifies buckets and writes the audit CSV.
pub mod audit;

/// Command line interface construction for both tools.
pub mod cli;

/// Common types shared by the audit and remediation tools.
pub mod common;

/// Bucket policy template handling.
pub mod policy;

/// Remediator: reads the audit CSV and fixes unencrypted buckets.
pub mod remediate;

/// S3 `Client`.
pub mod s3;
