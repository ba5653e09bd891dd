use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use almanac_core::connector::{
    AlmanacConnector, EarningsCalendarProvider, MacroSeriesProvider, ProfileProvider,
    QuoteProvider,
};
use almanac_core::{
    AlmanacError, Capability, EarningsEvent, Instrument, InstrumentProfile, MacroObservation,
    MacroSeries, Quote,
};

/// Instruction for how a method should behave for a given input.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(AlmanacError),
    /// Hang indefinitely (simulate a stalled provider).
    Hang,
}

/// Scripted behaviours for one key. Earlier entries are consumed one call at a
/// time; the last one repeats forever.
type Script<T> = VecDeque<MockBehavior<T>>;

fn next_step<T: Clone>(script: &mut Script<T>) -> Option<MockBehavior<T>> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

#[derive(Default)]
struct InternalState {
    profile_rules: HashMap<String, Script<InstrumentProfile>>,
    quote_rules: HashMap<String, Script<Quote>>,
    earnings_rules: HashMap<String, Script<Vec<EarningsEvent>>>,
    macro_rules: HashMap<String, Script<Vec<MacroObservation>>>,
    latency: Duration,
}

#[derive(Default)]
struct Counters {
    profile: AtomicUsize,
    quote: AtomicUsize,
    earnings: AtomicUsize,
    macro_series: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Counters {
    fn for_capability(&self, cap: Capability) -> &AtomicUsize {
        match cap {
            Capability::Quote => &self.quote,
            Capability::EarningsCalendar => &self.earnings,
            Capability::MacroSeries => &self.macro_series,
            _ => &self.profile,
        }
    }
}

// Tracks concurrent calls; decrements on drop so cancelled calls are released too.
struct InFlight<'a>(&'a Counters);

impl<'a> InFlight<'a> {
    fn enter(c: &'a Counters) -> Self {
        let now = c.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        c.peak.fetch_max(now, Ordering::SeqCst);
        Self(c)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    counters: Arc<Counters>,
}

impl DynamicMockController {
    /// Set the behavior for `profile` calls for a symbol, replacing any script.
    pub async fn set_profile_behavior(&self, symbol: &str, behavior: MockBehavior<InstrumentProfile>) {
        let mut guard = self.state.lock().await;
        guard.profile_rules.insert(symbol.to_string(), VecDeque::from([behavior]));
    }

    /// Append a behavior to the `profile` script of a symbol.
    pub async fn push_profile_behavior(&self, symbol: &str, behavior: MockBehavior<InstrumentProfile>) {
        let mut guard = self.state.lock().await;
        guard.profile_rules.entry(symbol.to_string()).or_default().push_back(behavior);
    }

    /// Set the behavior for `quote` calls for a symbol, replacing any script.
    pub async fn set_quote_behavior(&self, symbol: &str, behavior: MockBehavior<Quote>) {
        let mut guard = self.state.lock().await;
        guard.quote_rules.insert(symbol.to_string(), VecDeque::from([behavior]));
    }

    /// Append a behavior to the `quote` script of a symbol.
    pub async fn push_quote_behavior(&self, symbol: &str, behavior: MockBehavior<Quote>) {
        let mut guard = self.state.lock().await;
        guard.quote_rules.entry(symbol.to_string()).or_default().push_back(behavior);
    }

    /// Set the behavior for `earnings_calendar` calls for a symbol.
    pub async fn set_earnings_behavior(
        &self,
        symbol: &str,
        behavior: MockBehavior<Vec<EarningsEvent>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.earnings_rules.insert(symbol.to_string(), VecDeque::from([behavior]));
    }

    /// Set the behavior for `series` calls for a series id.
    pub async fn set_macro_behavior(
        &self,
        series_id: &str,
        behavior: MockBehavior<Vec<MacroObservation>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.macro_rules.insert(series_id.to_string(), VecDeque::from([behavior]));
    }

    /// Delay applied before every call resolves.
    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    /// Number of calls made for a capability.
    #[must_use]
    pub fn calls(&self, capability: Capability) -> usize {
        self.counters.for_capability(capability).load(Ordering::SeqCst)
    }

    /// Total calls across all capabilities.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        [
            Capability::Profile,
            Capability::Quote,
            Capability::EarningsCalendar,
            Capability::MacroSeries,
        ]
        .into_iter()
        .map(|c| self.calls(c))
        .sum()
    }

    /// Highest number of calls observed in flight at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Zero every counter.
    pub fn reset_counters(&self) {
        for c in [
            &self.counters.profile,
            &self.counters.quote,
            &self.counters.earnings,
            &self.counters.macro_series,
            &self.counters.peak,
        ] {
            c.store(0, Ordering::SeqCst);
        }
    }

    /// Clear all configured behaviors.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.profile_rules.clear();
        guard.quote_rules.clear();
        guard.earnings_rules.clear();
        guard.macro_rules.clear();
    }
}

/// A connector that defers all behavior to an external controller.
///
/// Keys without a configured behavior fail with `NotFound`.
pub struct DynamicMockConnector {
    name: &'static str,
    capabilities: Vec<Capability>,
    state: Arc<Mutex<InternalState>>,
    counters: Arc<Counters>,
}

impl DynamicMockConnector {
    /// Create a dynamic mock advertising every capability, and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn AlmanacConnector>, DynamicMockController) {
        Self::with_capabilities(
            name,
            &[
                Capability::Profile,
                Capability::Quote,
                Capability::EarningsCalendar,
                Capability::MacroSeries,
            ],
        )
    }

    /// Create a dynamic mock advertising only `capabilities`, and its controller.
    #[must_use]
    pub fn with_capabilities(
        name: &'static str,
        capabilities: &[Capability],
    ) -> (Arc<dyn AlmanacConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let counters = Arc::new(Counters::default());
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            counters: Arc::clone(&counters),
        };
        let me = Arc::new(Self {
            name,
            capabilities: capabilities.to_vec(),
            state,
            counters,
        });
        (me as Arc<dyn AlmanacConnector>, controller)
    }

    fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    async fn run<T, F>(&self, cap: Capability, key: &str, pick: F) -> Result<T, AlmanacError>
    where
        T: Clone + Send,
        F: FnOnce(&mut InternalState) -> Option<&mut Script<T>> + Send,
    {
        self.counters.for_capability(cap).fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.counters);
        // Snapshot the behavior without holding the lock across await points.
        let (behavior, latency) = {
            let mut guard = self.state.lock().await;
            let latency = guard.latency;
            (pick(&mut *guard).and_then(next_step), latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(AlmanacError::not_found(format!("{cap} for {key}"))),
        }
    }
}

impl AlmanacConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        self.has(Capability::Profile)
            .then_some(self as &dyn ProfileProvider)
    }

    fn as_quote_provider(&self) -> Option<&dyn QuoteProvider> {
        self.has(Capability::Quote).then_some(self as &dyn QuoteProvider)
    }

    fn as_earnings_calendar_provider(&self) -> Option<&dyn EarningsCalendarProvider> {
        self.has(Capability::EarningsCalendar)
            .then_some(self as &dyn EarningsCalendarProvider)
    }

    fn as_macro_series_provider(&self) -> Option<&dyn MacroSeriesProvider> {
        self.has(Capability::MacroSeries)
            .then_some(self as &dyn MacroSeriesProvider)
    }
}

#[async_trait]
impl ProfileProvider for DynamicMockConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<InstrumentProfile, AlmanacError> {
        let key = instrument.symbol();
        self.run(Capability::Profile, key, |s| s.profile_rules.get_mut(key))
            .await
    }
}

#[async_trait]
impl QuoteProvider for DynamicMockConnector {
    async fn quote(&self, instrument: &Instrument) -> Result<Quote, AlmanacError> {
        let key = instrument.symbol();
        self.run(Capability::Quote, key, |s| s.quote_rules.get_mut(key))
            .await
    }
}

#[async_trait]
impl EarningsCalendarProvider for DynamicMockConnector {
    async fn earnings_calendar(
        &self,
        instrument: &Instrument,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, AlmanacError> {
        let key = instrument.symbol();
        let events: Vec<EarningsEvent> = self
            .run(Capability::EarningsCalendar, key, |s| {
                s.earnings_rules.get_mut(key)
            })
            .await?;
        Ok(events
            .into_iter()
            .filter(|e| e.date >= from && e.date <= to)
            .collect())
    }
}

#[async_trait]
impl MacroSeriesProvider for DynamicMockConnector {
    async fn series(&self, series: &MacroSeries) -> Result<Vec<MacroObservation>, AlmanacError> {
        let key = series.series_id.as_str();
        self.run(Capability::MacroSeries, key, |s| s.macro_rules.get_mut(key))
            .await
    }
}
