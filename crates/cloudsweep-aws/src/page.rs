//! Paginated API response shape
//!
//! Service API traits return one `Page` per call; the fetch routines keep
//! requesting pages until no continuation token remains, preserving the
//! provider's pagination order within a region.

/// One page of a paginated list/describe call.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A final page with no continuation token.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// A page continued by `next_token`.
    pub fn continued(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}
