//! # Slideshow Host Contract
//!
//! The slideshow host knows nothing about tides. It rotates through a set
//! of items, calling [`DisplayItem::update`] on its refresh timer and
//! [`DisplayItem::render`] when an item's turn comes up. This module
//! defines that contract and wires the tide pieces together behind it.

use crate::cache::TideCache;
use crate::chart::ChartRenderer;
use crate::config::Config;
use crate::driver::RefreshDriver;
use crate::frame::Frame;
use crate::noaa::PredictionSource;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::info;

/// What the rotation framework requires of every item it hosts.
///
/// `update` and `render` are called from different host threads on
/// independent timers, so implementations must be safe to drive
/// concurrently.
pub trait DisplayItem: Send + Sync {
    /// Name shown in the host's rotation list.
    fn friendly_name(&self) -> &str;

    /// How long the host should keep this item's image on screen.
    fn display_duration_secs(&self) -> u64;

    /// Number of images this item offers per rotation.
    fn size(&self) -> usize;

    /// Give the item a chance to refresh its data. Called on the host's
    /// schedule, at least once per configured expiration period.
    fn update(&self, now: NaiveDateTime);

    /// Produce the image for one rotation slot. `index` may be any value;
    /// items with a single image ignore it.
    fn render(&self, index: usize, now: NaiveDateTime) -> Frame;
}

/// The tide chart as a slideshow item: one image, refreshed daily.
pub struct TideDisplay<S> {
    config: Config,
    cache: Arc<TideCache>,
    driver: RefreshDriver<S>,
    renderer: ChartRenderer,
}

impl<S: PredictionSource> TideDisplay<S> {
    /// Wire a validated configuration and a fetch collaborator into a
    /// ready-to-register display item.
    pub fn new(config: Config, source: S) -> Self {
        info!(
            name = %config.station.friendly_name,
            station = %config.station.id,
            "creating tide display"
        );

        let cache = Arc::new(TideCache::new());
        let driver = RefreshDriver::new(Arc::clone(&cache), source, config.station.id.clone());
        let renderer = ChartRenderer::new(
            config.station.friendly_name.clone(),
            config.station.id.clone(),
        );

        TideDisplay {
            config,
            cache,
            driver,
            renderer,
        }
    }

    /// How often the host should call [`DisplayItem::update`], in minutes.
    pub fn expiration_period_mins(&self) -> u64 {
        self.config.rotation.expiration_period_mins
    }
}

impl<S: PredictionSource + Send + Sync> DisplayItem for TideDisplay<S> {
    fn friendly_name(&self) -> &str {
        &self.config.station.friendly_name
    }

    fn display_duration_secs(&self) -> u64 {
        self.config.rotation.display_duration_secs
    }

    fn size(&self) -> usize {
        1
    }

    fn update(&self, now: NaiveDateTime) {
        self.driver.tick(now);
    }

    fn render(&self, _index: usize, now: NaiveDateTime) -> Frame {
        self.renderer.render(&self.cache.snapshot(), now)
    }
}
