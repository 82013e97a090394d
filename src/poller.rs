//! Polling loop: rebuild the universe daily, scan a batch, notify, sleep.
//!
//! Every network call is awaited in turn; nothing is spawned, so tickers are
//! scanned strictly in universe order.

use std::time::{Duration, Instant};

use strum::Display;
use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::market::MarketDataSource;
use crate::metrics;
use crate::notify::{Notifier, STARTUP_MESSAGE};
use crate::scanner::{scan_ticker, ScanParams};
use crate::universe::{build_universe, UniverseParams};

/// Where the poller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollerState {
    /// Before the startup notice and first universe build.
    Starting,
    /// Scanning a batch.
    Scanning,
    /// Waiting for the next cycle.
    Sleeping,
}

/// Loop timing and fan-out bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerParams {
    /// Tickers scanned per cycle.
    pub batch_size: usize,
    /// Sleep between cycles.
    pub poll_interval: Duration,
    /// Universe rebuild interval.
    pub universe_refresh: Duration,
    /// Wall-clock bound on one batch.
    pub scan_budget: Option<Duration>,
}

impl From<&Config> for PollerParams {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.scan_batch_size,
            poll_interval: config.poll_interval(),
            universe_refresh: config.universe_refresh(),
            scan_budget: config.scan_budget(),
        }
    }
}

/// Counts from one scan batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Tickers scanned.
    pub scanned: usize,
    /// Alerts produced.
    pub alerts: usize,
    /// Tickers whose scan failed.
    pub failures: usize,
    /// Alerts that could not be delivered.
    pub notify_failures: usize,
    /// Batch stopped early on the scan budget.
    pub truncated: bool,
}

/// The long-running poller.
#[derive(Debug)]
pub struct Poller<S, N> {
    source: S,
    notifier: N,
    universe_params: UniverseParams,
    scan_params: ScanParams,
    params: PollerParams,
    universe: Vec<String>,
    last_refresh: Option<Instant>,
    state: PollerState,
}

impl<S: MarketDataSource, N: Notifier> Poller<S, N> {
    /// Create a poller from config.
    pub fn new(config: &Config, source: S, notifier: N) -> Self {
        Self {
            source,
            notifier,
            universe_params: UniverseParams::from(config),
            scan_params: ScanParams::from(config),
            params: PollerParams::from(config),
            universe: Vec::new(),
            last_refresh: None,
            state: PollerState::Starting,
        }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Current universe.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// When the universe was last rebuilt.
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn transition(&mut self, next: PollerState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "Poller state change");
            self.state = next;
        }
    }

    /// Deliver one message; failures are logged and counted, never retried.
    async fn deliver(&self, text: &str) -> bool {
        match self.notifier.send(text).await {
            Ok(()) => {
                metrics::inc_notifications_sent();
                true
            }
            Err(e) => {
                metrics::inc_notifications_failed();
                error!(error = %e, "❌ Notification failed");
                false
            }
        }
    }

    /// Send the startup notice and build the first universe.
    pub async fn start(&mut self) {
        self.deliver(STARTUP_MESSAGE).await;
        self.refresh_universe().await;
        info!(count = self.universe.len(), "✅ Loaded cheap tickers");
        self.transition(PollerState::Scanning);
    }

    /// Rebuild the universe. A failed build leaves it empty until the next refresh.
    ///
    /// The refresh clock starts when the build finishes.
    pub async fn refresh_universe(&mut self) {
        match build_universe(&self.source, &self.universe_params).await {
            Ok(universe) => self.universe = universe.tickers,
            Err(e) => {
                error!(error = %e, "❌ Error fetching tickers");
                self.universe.clear();
            }
        }
        self.last_refresh = Some(Instant::now());
        metrics::inc_universe_rebuilds();
        metrics::set_universe_size(self.universe.len());
    }

    /// Whether a rebuild is due at `now`.
    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            Some(last) => now.saturating_duration_since(last) >= self.params.universe_refresh,
            None => true,
        }
    }

    /// Rebuild the universe if the refresh interval has elapsed.
    pub async fn refresh_if_due(&mut self, now: Instant) -> bool {
        if !self.refresh_due(now) {
            return false;
        }
        self.refresh_universe().await;
        info!(count = self.universe.len(), "🔄 Refreshed ticker list");
        true
    }

    /// Scan the leading batch of the universe in order, notifying on each alert.
    #[instrument(skip(self), fields(universe = self.universe.len()))]
    pub async fn scan_batch(&mut self) -> BatchSummary {
        self.transition(PollerState::Scanning);
        let _timer = metrics::timer_scan_batch();
        let started = Instant::now();
        let mut summary = BatchSummary::default();

        let batch: Vec<String> = self
            .universe
            .iter()
            .take(self.params.batch_size)
            .cloned()
            .collect();

        for ticker in &batch {
            if let Some(budget) = self.params.scan_budget {
                if started.elapsed() >= budget {
                    warn!(
                        scanned = summary.scanned,
                        budget_s = budget.as_secs(),
                        "Scan budget exhausted, ending batch early"
                    );
                    summary.truncated = true;
                    break;
                }
            }

            summary.scanned += 1;
            metrics::inc_tickers_scanned();

            match scan_ticker(&self.source, ticker, &self.scan_params).await {
                Ok(Some(alert)) => {
                    summary.alerts += 1;
                    metrics::inc_alerts_emitted();
                    let text = alert.to_string();
                    info!(ticker = %ticker, "{}", text);
                    if !self.deliver(&text).await {
                        summary.notify_failures += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    summary.failures += 1;
                    metrics::inc_scan_failures();
                    warn!(ticker = %ticker, error = %e, "❌ Error scanning ticker");
                }
            }
        }

        info!(
            scanned = summary.scanned,
            alerts = summary.alerts,
            failures = summary.failures,
            notify_failures = summary.notify_failures,
            elapsed_s = started.elapsed().as_secs(),
            "Batch complete"
        );

        summary
    }

    /// Run forever: start, then refresh-if-due, scan, sleep.
    pub async fn run(mut self) {
        self.start().await;

        loop {
            self.refresh_if_due(Instant::now()).await;
            self.scan_batch().await;

            self.transition(PollerState::Sleeping);
            tokio::time::sleep(self.params.poll_interval).await;
        }
    }
}
