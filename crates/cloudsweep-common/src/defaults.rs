//! Default audit configuration values
//!
//! These constants keep defaults consistent across collectors and tests.

/// Default ARN partition for commercial AWS
pub const DEFAULT_PARTITION: &str = "aws";

/// Region used for account identity lookup and global listings
pub const DEFAULT_HOME_REGION: &str = "us-east-1";
