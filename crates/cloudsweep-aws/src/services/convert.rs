//! Conversions from SDK primitive types

use chrono::{DateTime, Utc};

/// Convert a smithy timestamp to UTC. Returns `None` for timestamps
/// outside the chrono-representable range.
pub(crate) fn to_utc(dt: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_epoch_seconds() {
        let dt = aws_smithy_types::DateTime::from_secs(1_700_000_000);
        let utc = to_utc(&dt).unwrap();
        assert_eq!(utc.timestamp(), 1_700_000_000);
    }
}
