// =============================================================================
// Alert Engine — per-symbol, per-day notification deduplication
// =============================================================================
//
// Invariant: at most one alert record (and one successful notification) per
// (symbol, calendar day), regardless of how many scans run or how many
// distinct signal kinds fire.  The check-then-send-then-record sequence is
// held under one async mutex so concurrent scans of the same symbol cannot
// both pass the dedup check.
//
// "Today" is the UTC process clock; `now` is an explicit parameter on every
// operation so tests can pin it.
//
// The log is persisted in full after every mutation.  A load failure at
// startup degrades to an empty log (worst case: one duplicate notification
// per symbol-day after losing the file).  A save failure after a successful
// send is surfaced as an error — the notification went out but durability
// is not guaranteed.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::indicators::EnrichedSeries;
use crate::signals::detect;
use crate::types::Signal;

use super::message::{alert_body, alert_subject};
use super::notifier::Notifier;
use super::store::{AlertLogMap, AlertStore};

/// One successful notification for a (symbol, day) pair.  Immutable once
/// created; only ever removed by pruning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub signals: Vec<Signal>,
    pub price: f64,
}

/// What a `check_and_notify` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// The latest bar fired no signals.
    NoSignals,
    /// A record for this symbol already exists today.
    AlreadySentToday,
    /// Signals fired but the notifier reported failure; nothing recorded.
    NotifierFailed,
    /// Notification delivered and recorded.
    Sent,
}

impl AlertOutcome {
    /// True iff a new record was created and the notifier succeeded.
    pub fn notified(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Aggregate counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub today_alerts: usize,
    pub symbols_with_alerts: usize,
}

/// The stateful alert deduplicator.
pub struct AlertEngine<S: AlertStore, N: Notifier> {
    store: S,
    notifier: N,
    log: Mutex<AlertLogMap>,
}

impl<S: AlertStore, N: Notifier> AlertEngine<S, N> {
    /// Load the persisted log and build the engine.  An unreadable log file
    /// degrades to an empty log with a warning rather than refusing to
    /// start.
    pub fn new(store: S, notifier: N) -> Self {
        let log = match store.load() {
            Ok(map) => {
                info!(symbols = map.len(), "alert log loaded");
                map
            }
            Err(e) => {
                warn!(error = %e, "failed to load alert log — starting empty");
                AlertLogMap::new()
            }
        };

        Self {
            store,
            notifier,
            log: Mutex::new(log),
        }
    }

    /// Detect signals on `series` and, if this symbol has not yet alerted
    /// today, notify and record.
    ///
    /// Returns `Err` only when the notification went out but the log could
    /// not be persisted (the in-memory record is kept in that case).
    pub async fn check_and_notify(
        &self,
        symbol: &str,
        series: &EnrichedSeries,
        now: DateTime<Utc>,
    ) -> Result<AlertOutcome> {
        let signals = detect(series);
        if signals.is_empty() {
            return Ok(AlertOutcome::NoSignals);
        }

        // detect() only returns signals for a non-empty series.
        let price = series.last_bar().map(|b| b.close).unwrap_or_default();
        let summary = series.latest().unwrap_or_default();

        let today = now.date_naive();

        // The dedup check, the send, and the record append form one
        // critical section per log.
        let mut log = self.log.lock().await;

        if let Some(records) = log.get(symbol) {
            if records.iter().any(|r| r.date == today) {
                return Ok(AlertOutcome::AlreadySentToday);
            }
        }

        let subject = alert_subject(symbol, signals.len());
        let body = alert_body(symbol, &signals, &summary, price, now);

        if let Err(e) = self.notifier.send(&subject, &body).await {
            warn!(symbol = %symbol, error = %e, "alert notification failed");
            return Ok(AlertOutcome::NotifierFailed);
        }

        log.entry(symbol.to_string()).or_default().push(AlertRecord {
            date: today,
            timestamp: now,
            signals,
            price,
        });

        self.store
            .save(&log)
            .context("alert sent but the log could not be persisted")?;

        info!(symbol = %symbol, price, "alert recorded");
        Ok(AlertOutcome::Sent)
    }

    /// Remove records older than `retention_days` and drop symbols left
    /// with none.  Returns the number of records removed.
    pub async fn prune(&self, retention_days: u32, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - Duration::days(i64::from(retention_days));

        let mut log = self.log.lock().await;
        let before: usize = log.values().map(Vec::len).sum();

        log.retain(|_, records| {
            records.retain(|r| r.timestamp >= cutoff);
            !records.is_empty()
        });

        let removed = before - log.values().map(Vec::len).sum::<usize>();
        if removed > 0 {
            self.store
                .save(&log)
                .context("failed to persist alert log after pruning")?;
            info!(removed, "old alert records pruned");
        }

        Ok(removed)
    }

    /// Aggregate counts: total records, records dated today, and distinct
    /// symbols with at least one record.
    pub async fn summary(&self, now: DateTime<Utc>) -> AlertSummary {
        let today = now.date_naive();
        let log = self.log.lock().await;

        AlertSummary {
            total_alerts: log.values().map(Vec::len).sum(),
            today_alerts: log
                .values()
                .flat_map(|records| records.iter())
                .filter(|r| r.date == today)
                .count(),
            symbols_with_alerts: log.len(),
        }
    }

    /// Snapshot of the full log for the dashboard.
    pub async fn records(&self) -> AlertLogMap {
        self.log.lock().await.clone()
    }
}
