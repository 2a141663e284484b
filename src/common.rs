// Common traits and types
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod audit_record;
mod client_config;
mod region;

pub use audit_record::*;
pub use client_config::*;
pub use region::*;

/// Bucket names as returned by the ListBuckets API.
pub type BucketNames = Vec<String>;
