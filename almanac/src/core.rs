use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use almanac_cache::{CacheStore, MemoryBackend};
use almanac_core::{
    AlmanacConfig, AlmanacConnector, AlmanacError, BackoffConfig, Capability, Clock,
    ConcurrencyScope, DateWindow, EconomicSchedule, Instrument, PersistenceBackend, SystemClock,
    default_universe,
};
use chrono_tz::Tz;

use crate::pipeline::Published;
use crate::progress::ProgressTracker;
use crate::scheduler::Scheduler;

/// Pipeline context: connectors, cache, universe, schedule and the state
/// published by the latest run.
///
/// Build one with [`Almanac::builder`] and share it (e.g. behind an `Arc`)
/// between whatever triggers runs and whatever renders their results.
pub struct Almanac {
    pub(crate) connectors: Vec<Arc<dyn AlmanacConnector>>,
    pub(crate) cfg: AlmanacConfig,
    pub(crate) cache: CacheStore,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) universe: Vec<Instrument>,
    pub(crate) schedule: EconomicSchedule,
    pub(crate) progress: ProgressTracker,
    pub(crate) runs: AtomicU64,
    pub(crate) published: RwLock<Published>,
}

impl std::fmt::Debug for Almanac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.connectors.iter().map(|c| c.name()).collect();
        f.debug_struct("Almanac")
            .field("connectors", &names)
            .field("cfg", &self.cfg)
            .field("instruments", &self.universe.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing an [`Almanac`] with custom configuration.
pub struct AlmanacBuilder {
    connectors: Vec<Arc<dyn AlmanacConnector>>,
    cfg: AlmanacConfig,
    backend: Option<Arc<dyn PersistenceBackend>>,
    clock: Option<Arc<dyn Clock>>,
    universe: Option<Vec<Instrument>>,
    schedule: EconomicSchedule,
}

impl Default for AlmanacBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlmanacBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connectors; you must register at least one via [`with_connector`](Self::with_connector).
    /// - Defaults to an in-memory cache, the wall clock, the stock universe and the
    ///   2025 CPI/PPI release schedule.
    /// - Concurrency 2 per group, 1s pacing (1.2s for macro series), one 60s
    ///   cooldown on throttling, 24h cache TTL, 30s provider timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: AlmanacConfig::default(),
            backend: None,
            clock: None,
            universe: None,
            schedule: EconomicSchedule::default(),
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order is priority order: for each capability the
    /// orchestrator tries the connectors exposing it first to last and falls
    /// back to the next one on failure.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn AlmanacConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: AlmanacConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Persistence backend underneath the cache (default: in-memory).
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn PersistenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Time source for cache stamps and "today" (default: wall clock).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Instruments to track, in display order. Duplicates are rejected by `build`.
    #[must_use]
    pub fn universe(mut self, instruments: Vec<Instrument>) -> Self {
        self.universe = Some(instruments);
        self
    }

    /// Macro release schedule and the series that back-fill it.
    #[must_use]
    pub fn schedule(mut self, schedule: EconomicSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Maximum number of in-flight provider tasks.
    #[must_use]
    pub const fn concurrency(mut self, limit: usize) -> Self {
        self.cfg.concurrency = limit;
        self
    }

    /// Whether the concurrency limit applies per group or to the whole run.
    ///
    /// Behavior and trade-offs:
    /// - `PerGroup` lets the four groups run side by side, each with its own
    ///   limit; runs finish sooner but up to four times the limit hits providers.
    /// - `Shared` caps the run as a whole, which is gentler on providers that
    ///   serve several groups.
    #[must_use]
    pub const fn concurrency_scope(mut self, scope: ConcurrencyScope) -> Self {
        self.cfg.concurrency_scope = scope;
        self
    }

    /// Cooldown policy for throttled tasks.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = cfg;
        self
    }

    /// Pause after each successful per-instrument call.
    #[must_use]
    pub const fn request_delay(mut self, delay: Duration) -> Self {
        self.cfg.request_delay = delay;
        self
    }

    /// Pause after each successful macro series call.
    #[must_use]
    pub const fn macro_request_delay(mut self, delay: Duration) -> Self {
        self.cfg.macro_request_delay = delay;
        self
    }

    /// Age after which cached group results are ignored.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cfg.cache_ttl = ttl;
        self
    }

    /// Set the per-provider request timeout.
    ///
    /// A timed out call counts as a failure of that provider; the next provider
    /// exposing the capability is tried.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Fixed earnings fetch window instead of the calendar year of "today".
    #[must_use]
    pub const fn earnings_window(mut self, window: DateWindow) -> Self {
        self.cfg.earnings_window = Some(window);
        self
    }

    /// Time zone that decides the current date.
    #[must_use]
    pub const fn market_timezone(mut self, tz: Tz) -> Self {
        self.cfg.market_timezone = tz;
        self
    }

    /// Build the `Almanac` context.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connector is registered, the universe is
    /// empty or repeats an instrument, the concurrency limit is zero, or the
    /// earnings window ends before it starts.
    pub fn build(self) -> Result<Almanac, AlmanacError> {
        if self.connectors.is_empty() {
            return Err(AlmanacError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }
        if self.cfg.concurrency == 0 {
            return Err(AlmanacError::InvalidArg(
                "concurrency must be greater than zero".to_string(),
            ));
        }
        if let Some(w) = self.cfg.earnings_window
            && w.from > w.to
        {
            return Err(AlmanacError::InvalidArg(format!(
                "earnings window ends before it starts: {}",
                w.cache_param()
            )));
        }

        let universe = self.universe.unwrap_or_else(default_universe);
        if universe.is_empty() {
            return Err(AlmanacError::InvalidArg(
                "instrument universe must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = universe.iter().find(|i| !seen.insert(*i)) {
            return Err(AlmanacError::InvalidArg(format!(
                "duplicate instrument in universe: {dup}"
            )));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let cache = CacheStore::new(backend, Arc::clone(&clock), self.cfg.cache_ttl);

        Ok(Almanac {
            connectors: self.connectors,
            cfg: self.cfg,
            cache,
            clock,
            universe,
            schedule: self.schedule,
            progress: ProgressTracker::new(),
            runs: AtomicU64::new(0),
            published: RwLock::new(Published::default()),
        })
    }
}

/// Attribute a provider error to `connector`, keeping variants that already
/// say who failed or that callers classify (not found, timeout, throttling).
pub fn tag_err(connector: &str, e: AlmanacError) -> AlmanacError {
    match e {
        e @ (AlmanacError::NotFound { .. }
        | AlmanacError::ProviderTimeout { .. }
        | AlmanacError::RateLimited { .. }
        | AlmanacError::Connector { .. }
        | AlmanacError::AllProvidersFailed(_)) => e,
        other => AlmanacError::Connector {
            connector: connector.to_string(),
            msg: other.to_string(),
        },
    }
}

impl Almanac {
    /// Start building a new `Almanac`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use almanac_finnhub::FinnhubConnector;
    /// use almanac_alphavantage::AlphaVantageConnector;
    ///
    /// let almanac = almanac::Almanac::builder()
    ///     .with_connector(Arc::new(FinnhubConnector::new(finnhub_key)?))
    ///     .with_connector(Arc::new(AlphaVantageConnector::new(av_key)?))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> AlmanacBuilder {
        AlmanacBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &AlmanacConfig {
        &self.cfg
    }

    /// Tracked instruments, in display order.
    #[must_use]
    pub fn universe(&self) -> &[Instrument] {
        &self.universe
    }

    /// Macro release schedule.
    #[must_use]
    pub const fn schedule(&self) -> &EconomicSchedule {
        &self.schedule
    }

    /// The TTL cache shared by every run.
    #[must_use]
    pub const fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Registered connectors, in priority order.
    #[must_use]
    pub fn connectors(&self) -> &[Arc<dyn AlmanacConnector>] {
        &self.connectors
    }

    /// Scheduler for one run, honouring the configured scope.
    pub(crate) fn scheduler_for_run(&self) -> Scheduler {
        match self.cfg.concurrency_scope {
            ConcurrencyScope::Shared => Scheduler::shared(self.cfg.concurrency),
            _ => Scheduler::new(self.cfg.concurrency),
        }
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, AlmanacError>
    where
        Fut: core::future::Future<Output = Result<T, AlmanacError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(AlmanacError::provider_timeout(connector_name, capability)))
    }

    /// Try every connector that exposes `capability`, in registration order,
    /// until one succeeds.
    ///
    /// `call` returns `None` for connectors lacking the capability. Failures are
    /// collapsed by [`crate::collapse_errors`]: nothing attempted is
    /// `Unsupported`, all not-found is `NotFound("{capability} for {subject}")`,
    /// a lone failure is passed through unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "almanac::core::fetch_single",
            skip(self, call),
            fields(subject = %subject, capability = %capability),
        )
    )]
    pub(crate) async fn fetch_single<T, F, Fut>(
        &self,
        capability: Capability,
        subject: &str,
        call: F,
    ) -> Result<T, AlmanacError>
    where
        T: Send,
        F: Fn(Arc<dyn AlmanacConnector>) -> Option<Fut> + Send,
        Fut: core::future::Future<Output = Result<T, AlmanacError>> + Send,
    {
        let mut attempted_any = false;
        let mut errors: Vec<AlmanacError> = Vec::new();

        for c in &self.connectors {
            if let Some(fut) = call(Arc::clone(c)) {
                attempted_any = true;
                match Self::provider_call_with_timeout(
                    c.name(),
                    capability.as_str(),
                    self.cfg.provider_timeout,
                    fut,
                )
                .await
                {
                    Ok(v) => return Ok(v),
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(connector = c.name(), error = %e, "provider failed; trying next");
                        errors.push(tag_err(c.name(), e));
                    }
                }
            }
        }

        Err(crate::util::collapse_errors(
            capability,
            attempted_any,
            errors,
            Some(format!("{capability} for {subject}")),
        ))
    }
}
