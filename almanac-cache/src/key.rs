use core::fmt;

use almanac_core::FetchGroup;

/// Cache key: a data kind plus an optional parameter, rendered `kind` or `kind:param`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: String,
    param: Option<String>,
}

impl CacheKey {
    /// Build a key from its parts.
    pub fn new(kind: impl Into<String>, param: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            param,
        }
    }

    /// Key for a whole fetch group's result.
    pub fn for_group(group: FetchGroup, param: Option<String>) -> Self {
        Self::new(group.cache_kind(), param)
    }

    /// Data kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Optional parameter.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(p) => write!(f, "{}:{p}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}
