// Handles region things
#![forbid(unsafe_code)]
use aws_config::meta::region::future;
use aws_config::meta::region::ProvideRegion;
use aws_types::region;
use tracing::debug;

/// Baseline region used when neither the CLI nor the environment provide
/// one, and when a bucket's location constraint comes back empty.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The region an AWS client should be created in.
///
/// Wraps the SDK region so it can be handed to `aws_config` builders via
/// `ProvideRegion`, while remaining comparable and printable for our own
/// purposes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Region {
    region: Option<region::Region>,
}

impl Region {
    /// Returns the region name.
    pub fn name(&self) -> &str {
        match &self.region {
            Some(region) => region.as_ref(),
            None         => "default",
        }
    }

    /// Sets the region to the given name.
    pub fn set_region(mut self, region: &str) -> Self {
        debug!("Region set to: {:?}", region);

        let region = region::Region::new(region.to_string());
        self.region = Some(region);
        self
    }
}

impl ProvideRegion for Region {
    // Takes our region string and returns a proper AWS Region, this should
    // allow us to pass our Region into AWS SDK functions expecting an AWS
    // Region.
    fn region(&self) -> future::ProvideRegion {
        future::ProvideRegion::ready(self.region.to_owned())
    }
}

impl ProvideRegion for &Region {
    // As above, for borrowed regions.
    fn region(&self) -> future::ProvideRegion {
        future::ProvideRegion::ready(self.region.to_owned())
    }
}
