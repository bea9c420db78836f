//! # NOAA Prediction Fetching
//!
//! This module is the outbound boundary: it turns a station id and a
//! calendar day into a [`TideDataset`] by calling NOAA's Tides and Currents
//! datagetter API and parsing the JSON response.
//!
//! ## Data Source
//!
//! - **URL**: <https://tidesandcurrents.noaa.gov/api/datagetter>
//! - **Product**: `predictions` against the MLLW datum, english units,
//!   station-local time zone
//! - **Window**: one calendar day, 00:00 through 23:54, which yields one
//!   sample every 6 minutes (240 per day)
//!
//! The response is one of two shapes, probed exactly once here:
//!
//! ```json
//! { "predictions": [ { "t": "2021-07-11 00:00", "v": "3.362" }, ... ] }
//! { "error": { "message": "No data was found..." } }
//! ```
//!
//! A service-reported error becomes [`TideDataset::Error`] carrying the
//! service's own message, so the chart can show it verbatim. Transport and
//! parse failures are [`FetchError`]s; the refresh driver collapses those
//! to a generic error dataset. No finer taxonomy leaves this module.

use crate::{TideDataset, TidePrediction};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Base URL for the datagetter API.
const DATAGETTER_URL: &str = "https://tidesandcurrents.noaa.gov/api/datagetter";

/// Application tag NOAA asks API clients to send.
const APPLICATION: &str = "tide-panel";

/// HTTP timeout. The fetch may legitimately take seconds on a slow link,
/// but it must complete or fail within a bounded window so a refresh can
/// always be resolved to a dataset.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching or decoding predictions.
///
/// These never reach the host or the renderer; the refresh driver converts
/// them into an error dataset for display.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON document
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Document had neither an error message nor a predictions array
    #[error("response contained no predictions and no error")]
    MissingPredictions,

    /// A prediction height was not a number
    #[error("malformed height value {0:?}")]
    MalformedHeight(String),

    /// Tokio runtime could not be created
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// One day's worth of request parameters for the datagetter API.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionRequest {
    pub station: String,
    pub begin_date: String,
    pub end_date: String,
}

impl PredictionRequest {
    /// Request covering one full calendar day for a station: 00:00 through
    /// 23:54 in the station's local time, the last 6-minute slot of the day.
    pub fn for_day(station: &str, day: NaiveDate) -> Self {
        PredictionRequest {
            station: station.to_string(),
            begin_date: format!("{} 00:00", day.format("%Y%m%d")),
            end_date: format!("{} 23:54", day.format("%Y%m%d")),
        }
    }
}

/// The black-box fetch boundary the refresh driver depends on.
///
/// The production implementation is [`NoaaClient`]; tests substitute their
/// own to count calls or inject failures.
pub trait PredictionSource {
    /// Fetch a day of predictions.
    ///
    /// `Ok(TideDataset::Error(..))` means the service answered with an
    /// error document; `Err(..)` means the request itself failed.
    fn fetch(&self, request: &PredictionRequest) -> Result<TideDataset, FetchError>;
}

/// HTTP client for the datagetter API.
///
/// Owns a small current-thread Tokio runtime so the blocking `fetch`
/// contract can be met with the async reqwest stack. The refresh driver
/// calls `fetch` from its own timer context, never from a render path, so
/// blocking here is fine.
pub struct NoaaClient {
    http: reqwest::Client,
    rt: tokio::runtime::Runtime,
}

impl NoaaClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(NoaaClient { http, rt })
    }
}

impl PredictionSource for NoaaClient {
    fn fetch(&self, request: &PredictionRequest) -> Result<TideDataset, FetchError> {
        debug!(
            station = %request.station,
            begin = %request.begin_date,
            "fetching NOAA predictions"
        );

        let body = self.rt.block_on(async {
            self.http
                .get(DATAGETTER_URL)
                .query(&[
                    ("begin_date", request.begin_date.as_str()),
                    ("end_date", request.end_date.as_str()),
                    ("station", request.station.as_str()),
                    ("product", "predictions"),
                    ("datum", "MLLW"),
                    ("units", "english"),
                    ("time_zone", "lst_ldt"),
                    ("application", APPLICATION),
                    ("format", "json"),
                ])
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        })?;

        parse_response(&body)
    }
}

// -- Wire format --

#[derive(Deserialize)]
struct DatagetterResponse {
    error: Option<DatagetterError>,
    predictions: Option<Vec<RawPrediction>>,
}

#[derive(Deserialize)]
struct DatagetterError {
    message: String,
}

#[derive(Deserialize)]
struct RawPrediction {
    t: String,
    v: String,
}

/// Decode a datagetter JSON body into the tagged dataset.
///
/// Heights arrive as numeric strings ("3.362") and are parsed to `f32`
/// here, once; the renderer only ever sees numbers.
pub fn parse_response(body: &str) -> Result<TideDataset, FetchError> {
    let doc: DatagetterResponse = serde_json::from_str(body)?;

    if let Some(error) = doc.error {
        return Ok(TideDataset::Error(error.message));
    }

    let raw = doc.predictions.ok_or(FetchError::MissingPredictions)?;
    let mut predictions = Vec::with_capacity(raw.len());
    for entry in raw {
        let height_ft: f32 = entry
            .v
            .trim()
            .parse()
            .map_err(|_| FetchError::MalformedHeight(entry.v.clone()))?;
        predictions.push(TidePrediction {
            time: entry.t,
            height_ft,
        });
    }

    Ok(TideDataset::Predictions(predictions))
}
