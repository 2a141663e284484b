// ClientConfig
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::Region;
use std::time::Duration;

/// Client configuration.
#[derive(Debug)]
pub struct ClientConfig {
    /// The region that our AWS client should be created in.
    ///
    /// This is always passed in explicitly, there is no shared global
    /// default.
    pub region: Region,

    /// Maximum number of buckets processed in parallel.
    pub concurrency: usize,

    /// Per-bucket deadline for classification and remediation work.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region:      Region::default(),
            concurrency: 16,
            timeout:     Duration::from_secs(30),
        }
    }
}
