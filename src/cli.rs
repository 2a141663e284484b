// Command line interface parsing
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use clap::{
    crate_version,
    value_parser,
    Arg,
    ArgMatches,
    Command,
};
use crate::common::{
    ClientConfig,
    Region,
    DEFAULT_REGION,
};
use std::time::Duration;
use tracing::debug;

// Default number of buckets processed in parallel.
const DEFAULT_CONCURRENCY: &str = "16";

// Default per-bucket deadline in seconds.
const DEFAULT_TIMEOUT: &str = "30";

// Arguments shared by both tools.
fn create_command(name: &'static str, about: &'static str) -> Command {
    debug!("Creating CLI command for '{}'", name);

    Command::new(name)
        .version(crate_version!())
        .about(about)
        .arg(
            Arg::new("REGION")
                .env("AWS_REGION")
                .hide_env_values(true)
                .value_name("REGION")
                .help("AWS region to create the client in")
                .default_value(DEFAULT_REGION)
        )
        .arg(
            Arg::new("CONCURRENCY")
                .long("concurrency")
                .short('c')
                .value_name("LIMIT")
                .help("Maximum number of buckets processed in parallel")
                .value_parser(value_parser!(u64).range(1..))
                .default_value(DEFAULT_CONCURRENCY)
        )
        .arg(
            Arg::new("TIMEOUT")
                .long("timeout")
                .short('t')
                .value_name("SECONDS")
                .help("Per-bucket deadline in seconds")
                .value_parser(value_parser!(u64).range(1..))
                .default_value(DEFAULT_TIMEOUT)
        )
}

fn audit_command() -> Command {
    create_command(
        "sse-audit",
        "Audits S3 buckets for default encryption and public-read exposure",
    )
}

fn remediate_command() -> Command {
    create_command(
        "sse-remediate",
        "Applies default encryption and a bucket policy to buckets the audit \
         found unencrypted and non-public",
    )
}

/// Parse command line arguments for the auditor.
pub fn parse_audit_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    audit_command().get_matches()
}

/// Parse command line arguments for the remediator.
pub fn parse_remediate_args() -> ArgMatches {
    debug!("Parsing command line arguments");

    remediate_command().get_matches()
}

/// Build a `ClientConfig` from parsed arguments.
pub fn client_config(matches: &ArgMatches) -> ClientConfig {
    let region = matches.get_one::<String>("REGION")
        .map(String::as_str)
        .unwrap_or(DEFAULT_REGION);

    let concurrency = matches.get_one::<u64>("CONCURRENCY")
        .copied()
        .unwrap_or(16);

    let timeout = matches.get_one::<u64>("TIMEOUT")
        .copied()
        .unwrap_or(30);

    ClientConfig {
        region:      Region::default().set_region(region),
        concurrency: concurrency as usize,
        timeout:     Duration::from_secs(timeout),
    }
}
