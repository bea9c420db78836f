//! # Tide Panel Core Library
//!
//! This library renders a full day of NOAA tide-height predictions as a
//! labeled chart image, for display on a timed rotation inside a slideshow
//! host. The host drives the component through two calls: a periodic
//! [`display::DisplayItem::update`] that decides whether today's predictions
//! need to be fetched, and [`display::DisplayItem::render`] that turns the
//! currently cached dataset into a 1280x800 pixel frame.
//!
//! ## Design Philosophy
//!
//! ### One fetch per day
//! NOAA publishes a fixed set of predictions for a calendar day (one sample
//! every 6 minutes, 240 per day), so there is nothing to gain from polling.
//! The cache records which day its dataset was fetched for and refuses to
//! fetch again until 6 AM the following morning, even when the fetch failed.
//! Checking the service too often gets the client locked out.
//!
//! ### Readers never wait on the network
//! The dataset lives behind an [`std::sync::Arc`] swapped under a mutex that
//! is held only long enough to copy the reference. The multi-second network
//! fetch runs entirely outside the lock, so the host's render timer keeps
//! serving the previous chart while a refresh is in flight.
//!
//! ### Data Flow
//! 1. **Refresh**: host timer → [`driver::RefreshDriver::tick`] → NOAA fetch
//!    → [`cache::TideCache::replace`]
//! 2. **Render**: host rotation → [`cache::TideCache::snapshot`] →
//!    [`chart::ChartRenderer::render`] → [`frame::Frame`]
//! 3. **Failure**: any fetch or parse problem is stored as
//!    [`TideDataset::Error`] and rendered as a text-only error chart until
//!    the next morning's refresh window.
//!
//! ## Core Types
//!
//! The library exports two primary types shared by every module:
//! - [`TidePrediction`]: a single predicted tide height
//! - [`TideDataset`]: a whole day of predictions, or the error that took
//!   their place

// Module declarations
pub mod cache;
pub mod chart;
pub mod config;
pub mod display;
pub mod driver;
pub mod frame;
pub mod noaa;

/// A single predicted tide height at one 6-minute interval.
///
/// `time` is NOAA's local timestring exactly as the service returned it
/// (e.g. `"2021-07-11 00:06"`). The chart positions samples by their index
/// in the day's sequence rather than by re-parsing the timestring, so it is
/// kept verbatim for logging and the date stamp only. `height_ft` is parsed
/// from the wire format once, at the fetch boundary; nothing downstream
/// parses numbers again.
///
/// # Example
/// ```
/// use tide_panel_lib::TidePrediction;
///
/// let first = TidePrediction {
///     time: "2021-07-11 00:00".to_string(),
///     height_ft: 3.36,
/// };
/// assert!(first.height_ft > 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TidePrediction {
    /// Local timestamp string from the service, chronological order
    pub time: String,
    /// Predicted height in feet above MLLW
    pub height_ft: f32,
}

/// A whole day of tide predictions, or the error that took their place.
///
/// This is a tagged variant on purpose: the service response is probed
/// exactly once, at the fetch boundary, and everything downstream matches
/// on the result instead of re-checking for an `error` key. A dataset is
/// produced wholesale by a fetch and never mutated field by field;
/// replacement in the cache is all or nothing.
///
/// # Example
/// ```
/// use tide_panel_lib::TideDataset;
///
/// let dataset = TideDataset::Error("No data was found".to_string());
/// assert!(!dataset.has_predictions());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TideDataset {
    /// Ordered predictions covering one calendar day (possibly empty)
    Predictions(Vec<TidePrediction>),
    /// Fetch or service failure, with the message to show on the chart
    Error(String),
}

impl TideDataset {
    /// The initial cache contents before any fetch has run.
    pub fn empty() -> Self {
        TideDataset::Predictions(Vec::new())
    }

    /// True when this dataset holds at least one prediction.
    pub fn has_predictions(&self) -> bool {
        matches!(self, TideDataset::Predictions(p) if !p.is_empty())
    }

    /// True for the empty initial dataset, which should be replaced at the
    /// first opportunity even within the same calendar day.
    pub fn is_empty_initial(&self) -> bool {
        matches!(self, TideDataset::Predictions(p) if p.is_empty())
    }
}
