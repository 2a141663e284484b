// Bucket policy template handling
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::{
    Context,
    Result,
};
use std::fs;
use std::path::Path;
use tracing::debug;

/// The policy template is read from here, in the working directory.
pub const POLICY_FILE: &str = "encryption-policy.json";

// Token in the template that gets replaced with the real bucket name.
const PLACEHOLDER: &str = "YourBucket";

// Known limitation: only the first two occurrences of the placeholder are
// substituted. The shipped template has exactly two sites; a template with
// more placeholder sites keeps the literal token from the third one on.
const MAX_SUBSTITUTIONS: usize = 2;

/// A bucket policy document with `YourBucket` placeholder sites.
#[derive(Clone, Debug)]
pub struct PolicyTemplate(String);

impl PolicyTemplate {
    /// Load a policy template from the given `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading policy template from '{}'", path.display());

        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;

        Ok(Self(template))
    }

    /// Render the policy document for the given `bucket`.
    pub fn render(&self, bucket: &str) -> String {
        self.0.replacen(PLACEHOLDER, bucket, MAX_SUBSTITUTIONS)
    }
}
