//! # Calendar-Aware Prediction Cache
//!
//! This module owns the one piece of shared mutable state in the crate: the
//! most recently fetched [`TideDataset`] together with the calendar day it
//! was fetched for and the earliest time another fetch is allowed.
//!
//! ## Refresh Discipline
//!
//! Tide predictions are per calendar day, so the cache refreshes at most
//! once per day. After any replacement, success or failure, the next fetch
//! is gated to 6 AM the following morning. A failed fetch therefore shows
//! an error chart until tomorrow instead of hammering the service in a
//! tight retry loop; NOAA locks out clients that check too often.
//!
//! ## Locking Discipline
//!
//! Readers and the writer only ever hold the mutex long enough to copy an
//! [`Arc`] and two small fields. The expensive work on both sides, network
//! fetch and chart rasterization, happens entirely outside the lock, so a
//! render on the host's compositing thread can never observe a dataset in
//! the middle of being replaced and never waits on the network.

use crate::TideDataset;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Hour of the morning at which the next day's fetch is allowed.
const REFRESH_HOUR: u32 = 6;

/// Day-token format, one token per calendar day (e.g. "07-11-21").
const DAY_TOKEN_FORMAT: &str = "%m-%d-%y";

/// Format the calendar-day token for a wall-clock time.
///
/// Tokens are only ever compared for equality, so the format just has to be
/// unique per day and stable across the process lifetime.
pub fn day_token(now: NaiveDateTime) -> String {
    now.format(DAY_TOKEN_FORMAT).to_string()
}

/// The earliest instant a refresh is allowed after one ran at `now`:
/// 6 AM on the following calendar day.
pub fn next_refresh_after(now: NaiveDateTime) -> NaiveDateTime {
    let tomorrow = now.date().succ_opt().unwrap_or_else(|| now.date());
    tomorrow
        .and_hms_opt(REFRESH_HOUR, 0, 0)
        .expect("6:00:00 is a valid time of day")
}

struct CacheState {
    dataset: Arc<TideDataset>,
    fetched_for_date: String,
    next_allowed_refresh: NaiveDateTime,
}

/// Thread-safe holder for the current day's predictions.
///
/// Many concurrent readers, at most one writer. The dataset behind the
/// returned [`Arc`] is immutable; replacement swaps the whole reference.
pub struct TideCache {
    state: Mutex<CacheState>,
}

impl TideCache {
    /// Create an empty cache that will request a fetch at the first tick.
    pub fn new() -> Self {
        // Epoch as the initial gate: any realistic clock is past it
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .expect("epoch is a valid date")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time");

        TideCache {
            state: Mutex::new(CacheState {
                dataset: Arc::new(TideDataset::empty()),
                fetched_for_date: "not set".to_string(),
                next_allowed_refresh: epoch,
            }),
        }
    }

    /// Current dataset, by reference copy. Constant time; never blocks on
    /// a fetch in progress.
    pub fn snapshot(&self) -> Arc<TideDataset> {
        let state = self.lock();
        Arc::clone(&state.dataset)
    }

    /// True when a fetch should run now.
    ///
    /// Both conditions must hold: the daily gate has passed, and the cached
    /// data is not already for today (or is the empty initial dataset,
    /// which is worth replacing even on the same day).
    pub fn should_refresh(&self, now: NaiveDateTime, today_token: &str) -> bool {
        let state = self.lock();
        if now < state.next_allowed_refresh {
            return false;
        }
        state.fetched_for_date != today_token || state.dataset.is_empty_initial()
    }

    /// Unconditionally swap in `dataset` as the data for `today_token` and
    /// advance the refresh gate to 6 AM tomorrow.
    ///
    /// Called for failures as well as successes; a [`TideDataset::Error`]
    /// value is stored and gated exactly like real predictions.
    pub fn replace(&self, dataset: TideDataset, today_token: &str, now: NaiveDateTime) {
        let next = next_refresh_after(now);
        debug!(day = %today_token, next_refresh = %next, "replacing cached dataset");

        let mut state = self.lock();
        state.dataset = Arc::new(dataset);
        state.fetched_for_date = today_token.to_string();
        state.next_allowed_refresh = next;
    }

    // A poisoned mutex only means a panic elsewhere mid-swap of an Arc and
    // two owned fields; the state is still coherent, so keep serving it.
    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TideCache {
    fn default() -> Self {
        Self::new()
    }
}
