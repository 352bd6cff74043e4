//! Resource identifier construction
//!
//! Every record in an inventory carries an ARN-shaped identifier built
//! deterministically from the audit scope and the upstream local id:
//! `arn:<partition>:<service>:<region>:<account>:<resource-type>/<id>`.

/// Build the identifier for a regional resource.
pub fn build(
    partition: &str,
    service: &str,
    region: &str,
    account: &str,
    resource_type: &str,
    id: &str,
) -> String {
    format!("arn:{partition}:{service}:{region}:{account}:{resource_type}/{id}")
}

/// Build the identifier for an S3 bucket.
///
/// Bucket identifiers carry neither region nor account; the bucket name is
/// globally unique.
pub fn bucket(partition: &str, name: &str) -> String {
    format!("arn:{partition}:s3:::{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_identifier_shape() {
        let arn = build("aws", "ec2", "eu-west-1", "123456789012", "instance", "i-0abc");
        assert_eq!(arn, "arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc");
    }

    #[test]
    fn partition_is_not_hardcoded() {
        let arn = build("aws-cn", "ec2", "cn-north-1", "123456789012", "volume", "vol-1");
        assert!(arn.starts_with("arn:aws-cn:"));
    }

    #[test]
    fn bucket_identifier_has_no_region_or_account() {
        assert_eq!(bucket("aws", "my-bucket"), "arn:aws:s3:::my-bucket");
    }
}
