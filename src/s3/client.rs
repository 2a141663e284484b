// Implements the S3 Client
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use anyhow::Result;
use aws_sdk_s3::client::Client as S3Client;
use aws_sdk_s3::types::{
    ServerSideEncryption,
    ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration,
    ServerSideEncryptionRule,
};
use crate::common::{
    BucketNames,
    ClientConfig,
    Region,
    DEFAULT_REGION,
};
use super::acl;
use tracing::{
    debug,
    warn,
};

/// The S3 `Client`.
#[derive(Clone)]
pub struct Client {
    /// The AWS SDK `S3Client`.
    pub client: S3Client,

    /// `Region` the client was created in.
    pub region: Region,
}

impl Client {
    /// Return a new S3 `Client` with the given `ClientConfig`.
    pub async fn new(config: ClientConfig) -> Self {
        let region = config.region;

        debug!("new: Creating S3Client in region '{}'", region.name());

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region.clone())
            .load()
            .await;

        let client = S3Client::new(&sdk_config);

        Self {
            client,
            region,
        }
    }

    /// Returns a list of bucket names.
    pub async fn list_buckets(&self) -> Result<BucketNames> {
        let output = self.client.list_buckets().send().await?;

        let bucket_names = output.buckets()
            .iter()
            .filter_map(|b| b.name().map(String::from))
            .collect();

        Ok(bucket_names)
    }

    /// Returns a `bool` indicating whether a default encryption configuration
    /// is attached to the given `bucket`.
    ///
    /// A failed GetBucketEncryption query is reported as `false`, exactly
    /// like a bucket with no configuration. The query error is only visible
    /// in the debug log.
    pub async fn is_bucket_encrypted(&self, bucket: &str) -> bool {
        debug!("is_bucket_encrypted for '{}'", bucket);

        match self.client.get_bucket_encryption().bucket(bucket).send().await {
            Ok(_) => true,
            Err(err) => {
                debug!("GetBucketEncryption failed for '{}': {:?}", bucket, err);

                false
            },
        }
    }

    /// Return the region name for the given `bucket`.
    ///
    /// This method will properly handle the case of the `null` (empty) and
    /// `EU` location constraints, by replacing them with `us-east-1` and
    /// `eu-west-1` respectively.
    pub async fn bucket_region(&self, bucket: &str) -> Result<String> {
        debug!("bucket_region for '{}'", bucket);

        let output = self.client.get_bucket_location().bucket(bucket).send().await?;

        // Location constraints for sufficiently old buckets in S3 may not
        // quite meet expectations. These returns are badly documented and the
        // assumptions here are based on what the web console does.
        let location = match output.location_constraint() {
            None             => DEFAULT_REGION.to_string(),
            Some(constraint) => {
                match constraint.as_str() {
                    ""   => DEFAULT_REGION.to_string(),
                    "EU" => "eu-west-1".to_string(),
                    name => name.to_string(),
                }
            },
        };

        debug!("GetBucketLocation API returned '{}'", location);

        Ok(location)
    }

    /// Returns a `bool` indicating whether the given `bucket` grants READ to
    /// the AllUsers group.
    ///
    /// Bucket ACLs have to be fetched with a region-correct client, so the
    /// bucket location is resolved first and the client rebound to that
    /// region. Location and ACL query failures both report `false`.
    pub async fn is_public_read(&self, bucket: &str) -> bool {
        debug!("is_public_read for '{}'", bucket);

        let location = match self.bucket_region(bucket).await {
            Ok(location) => location,
            Err(err) => {
                warn!("Failed to resolve region for '{}': {:?}", bucket, err);

                return false;
            },
        };

        let client = self.regional_client(&location);

        let output = match client.get_bucket_acl().bucket(bucket).send().await {
            Ok(output) => output,
            Err(err) => {
                warn!("GetBucketAcl failed for '{}': {:?}", bucket, err);

                return false;
            },
        };

        output.grants()
            .iter()
            .any(acl::grant_is_public_read)
    }

    /// Apply a default AES256 server-side-encryption rule to the given
    /// `bucket`.
    pub async fn put_default_encryption(&self, bucket: &str) -> Result<()> {
        debug!("put_default_encryption for '{}'", bucket);

        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::Aes256)
            .build()?;

        let rule = ServerSideEncryptionRule::builder()
            .apply_server_side_encryption_by_default(by_default)
            .build();

        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(rule)
            .build()?;

        self.client.put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(configuration)
            .send()
            .await?;

        Ok(())
    }

    /// Apply the given `policy` document to the given `bucket`.
    pub async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        debug!("put_bucket_policy for '{}'", bucket);

        self.client.put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await?;

        Ok(())
    }

    // Returns an S3Client bound to the given region, sharing the credentials
    // and HTTP stack of the existing client.
    fn regional_client(&self, region: &str) -> S3Client {
        let conf = self.client.config()
            .to_builder()
            .region(aws_sdk_s3::config::Region::new(region.to_string()))
            .build();

        S3Client::from_conf(conf)
    }
}
