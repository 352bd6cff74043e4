//! Resource tag pairs
//!
//! Tags are recorded in the order the provider returned them. A record the
//! provider returned without a tag list keeps `None` rather than an empty
//! set, preserving the observed/not-observed distinction some checks rely
//! on.

use serde::{Deserialize, Serialize};

/// One key/value tag on a cloud resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

impl ResourceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Map an upstream tag list into recorded pairs.
///
/// Provider SDKs use a different tag type per service, but every one has
/// optional key/value string fields. Entries missing either field are
/// dropped.
pub fn from_pairs<T>(
    tags: &[T],
    key: impl Fn(&T) -> Option<&str>,
    value: impl Fn(&T) -> Option<&str>,
) -> Vec<ResourceTag> {
    tags.iter()
        .filter_map(|t| match (key(t), value(t)) {
            (Some(k), Some(v)) => Some(ResourceTag::new(k, v)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_pairs_in_order() {
        let raw = [("env", Some("prod")), ("team", Some("storage"))];
        let tags = from_pairs(&raw, |t| Some(t.0), |t| t.1);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], ResourceTag::new("env", "prod"));
        assert_eq!(tags[1], ResourceTag::new("team", "storage"));
    }

    #[test]
    fn drops_entries_missing_key_or_value() {
        let raw = [("env", Some("prod")), ("broken", None)];
        let tags = from_pairs(&raw, |t| Some(t.0), |t| t.1);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "env");
    }
}
