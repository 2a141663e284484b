// Definition of an audit record
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use serde::Serialize;

/// The posture of a single bucket at audit time.
///
/// One of these is produced per bucket per audit run and serialized as one
/// CSV row. The two booleans are computed independently and may disagree in
/// any combination.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AuditRecord {
    /// The bucket name.
    pub bucket: String,

    /// Whether a default server-side-encryption configuration was found.
    ///
    /// A failed GetBucketEncryption query is reported as `false`, the same
    /// as a genuinely unencrypted bucket. Known imprecision, kept for
    /// compatibility with existing audit output.
    pub encrypted: bool,

    /// Whether the bucket ACL grants READ to the AllUsers group.
    pub public: bool,
}

impl AuditRecord {
    /// Returns `true` if this bucket should be remediated.
    ///
    /// Only buckets that are both unencrypted and non-public are fixed;
    /// public buckets need a manual remediation path.
    pub fn needs_remediation(&self) -> bool {
        !self.encrypted && !self.public
    }
}
