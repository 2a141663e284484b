// Imports all of the components needed for s3::client
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// ACL grant inspection.
pub mod acl;

/// S3 `Client`.
mod client;

pub use client::*;
