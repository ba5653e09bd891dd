use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the almanac workspace.
///
/// This wraps capability mismatches, argument validation errors, provider-tagged
/// failures, throttling signals, storage problems and scheduler failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlmanacError {
    /// No registered connector implements the requested capability.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "profile").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, bad numbers, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "profile for AAPL".
        what: String,
    },

    /// All selected providers failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<AlmanacError>),

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "quote", "earnings-calendar").
        capability: String,
    },

    /// The provider throttled the request (HTTP 429 or an equivalent body).
    #[error("rate limited by {provider}")]
    RateLimited {
        /// Connector name that signalled throttling.
        provider: String,
        /// Provider hint for when to retry, if one was given.
        retry_after_ms: Option<u64>,
    },

    /// The persistence backend could not complete an operation.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The scheduler could not run a task group at all.
    #[error("scheduler failure in {group}: {msg}")]
    Scheduler {
        /// Fetch group being scheduled.
        group: String,
        /// Human-readable description of the failure.
        msg: String,
    },
}

impl AlmanacError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RateLimited` error without a retry hint.
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            retry_after_ms: None,
        }
    }

    /// Helper: build a `Scheduler` error for a fetch group.
    pub fn scheduler(group: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Scheduler {
            group: group.into(),
            msg: msg.into(),
        }
    }

    /// Returns true when the error is a throttling signal.
    ///
    /// Aggregates count as throttled only when every contained error is.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::AllProvidersFailed(inner) => {
                !inner.is_empty() && inner.iter().all(Self::is_rate_limited)
            }
            _ => false,
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Non-actionable errors are those indicating capability absence or a benign
    /// not-found condition. Aggregates are classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } => false,
            Self::AllProvidersFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
