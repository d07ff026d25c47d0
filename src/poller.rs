//! The polling loop: fetch → filter new → process oldest-first → persist → sleep.
//!
//! Runs as a single actor. Cancellation is only observed while sleeping
//! between cycles, so a cycle that has started always finishes, including
//! persisting the marker.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{Notification, SocialApi};
use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::state::{ProcessingState, StateStore};

/// Summary of one polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Notifications returned by the server.
    pub fetched: usize,
    /// Notifications that led to an action.
    pub acted: usize,
    /// Whether this cycle only recorded the first-run baseline.
    pub baseline: bool,
    /// Whether the marker was written to disk.
    pub persisted: bool,
}

/// Owns the processing state and drives the dispatcher.
pub struct Poller {
    api: Arc<dyn SocialApi>,
    dispatcher: Dispatcher,
    store: StateStore,
    state: ProcessingState,
    interval: Duration,
}

impl Poller {
    pub fn new(
        config: Arc<BotConfig>,
        api: Arc<dyn SocialApi>,
        store: StateStore,
        state: ProcessingState,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&config), Arc::clone(&api)),
            interval: config.poll_interval,
            api,
            store,
            state,
        }
    }

    /// Build a poller resuming from whatever marker is on disk.
    pub async fn resume(
        config: Arc<BotConfig>,
        api: Arc<dyn SocialApi>,
    ) -> Result<Self> {
        let store = StateStore::new(config.state_file.clone());
        let last = store.load().await?;
        match last {
            Some(id) => info!(last_notification_id = id, "Resuming from saved state"),
            None => info!(path = %store.path().display(), "No saved state, first run"),
        }
        Ok(Self::new(config, api, store, ProcessingState::new(last)))
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    /// Poll until cancelled or until a cycle fails.
    ///
    /// The first cycle runs immediately; each later one starts a full
    /// interval after the previous one finished.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!("Poller started, polling every {}s", self.interval.as_secs());

        if cancel.is_cancelled() {
            info!("Poller shutting down");
            return Ok(());
        }

        loop {
            self.poll_once().await?;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Poller shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Run a single cycle.
    pub async fn poll_once(&mut self) -> Result<CycleReport> {
        self.state.begin_cycle();

        let batch = self.api.notifications().await?;
        debug!("Fetched {} notifications", batch.len());

        let mut report = CycleReport {
            fetched: batch.len(),
            ..CycleReport::default()
        };

        if self.state.is_unset() {
            // Don't respond retroactively on the first run.
            let baseline = batch.iter().map(|n| n.id).max().unwrap_or(0);
            self.state.set_baseline(baseline);
            report.baseline = true;
            info!(last_notification_id = baseline, "Recorded first-run baseline");
        } else {
            for notification in self.new_oldest_first(&batch) {
                let outcome = match self.dispatcher.handle(notification).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        // Keep what was already answered this cycle.
                        self.persist().await?;
                        return Err(e);
                    }
                };
                if outcome.is_action() {
                    self.state.advance(notification.id);
                    report.acted += 1;
                }
            }
        }

        report.persisted = self.persist().await?;

        Ok(report)
    }

    /// Save the marker if it moved this cycle.
    async fn persist(&mut self) -> Result<bool> {
        if !self.state.is_changed() {
            return Ok(false);
        }
        let Some(id) = self.state.last_notification_id() else {
            return Ok(false);
        };
        self.store.save(id).await?;
        self.state.begin_cycle();
        debug!(last_notification_id = id, "Saved state");
        Ok(true)
    }

    /// Notifications newer than the marker, oldest first.
    fn new_oldest_first<'a>(&self, batch: &'a [Notification]) -> Vec<&'a Notification> {
        let mut fresh: Vec<&Notification> =
            batch.iter().filter(|n| self.state.is_new(n.id)).collect();
        fresh.sort_by_key(|n| n.id);
        fresh
    }
}
