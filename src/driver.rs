//! # Refresh Orchestration
//!
//! The driver sits between the host's update timer and the cache. Each tick
//! asks the cache whether a fetch is due; most ticks return immediately
//! with no I/O. When one is due, the fetch runs with no lock held and the
//! outcome, whatever it is, goes back into the cache so the daily gate
//! always advances.

use crate::cache::{day_token, TideCache};
use crate::noaa::{PredictionRequest, PredictionSource};
use crate::TideDataset;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{info, warn};

/// Message stored when the request itself failed; the chart shows it along
/// with the station id.
const FETCH_FAILED_MESSAGE: &str = "fetch failed";

/// Orchestrates the once-daily refresh of the prediction cache.
pub struct RefreshDriver<S> {
    cache: Arc<TideCache>,
    source: S,
    station_id: String,
}

impl<S: PredictionSource> RefreshDriver<S> {
    pub fn new(cache: Arc<TideCache>, source: S, station_id: String) -> Self {
        RefreshDriver {
            cache,
            source,
            station_id,
        }
    }

    /// Refresh the cache if the daily gate allows it.
    ///
    /// The fetch may take seconds; it runs before the cache is touched
    /// again, so concurrent renders keep serving the previous snapshot
    /// until the single O(1) swap at the end.
    pub fn tick(&self, now: NaiveDateTime) {
        let today = day_token(now);
        if !self.cache.should_refresh(now, &today) {
            return;
        }

        info!(
            station = %self.station_id,
            day = %today,
            "refreshing tide predictions"
        );

        let request = PredictionRequest::for_day(&self.station_id, now.date());
        let dataset = match self.source.fetch(&request) {
            Ok(dataset) => dataset,
            Err(error) => {
                warn!(
                    station = %self.station_id,
                    %error,
                    "tide fetch failed; showing error chart until tomorrow"
                );
                TideDataset::Error(FETCH_FAILED_MESSAGE.to_string())
            }
        };

        self.cache.replace(dataset, &today, now);
    }
}
