//! # Tide Panel Entry Point
//!
//! Small driver around the library for running outside a slideshow host:
//! load the configuration, run one update/render cycle, and write the
//! chart to a PNG so it can be eyeballed or dropped into a kiosk image
//! directory by cron.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use chrono::Local;
use tide_panel_lib::config::Config;
use tide_panel_lib::display::{DisplayItem, TideDisplay};
use tide_panel_lib::noaa::NoaaClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "tide-panel.toml";
const DEFAULT_OUTPUT: &str = "tide-chart.png";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional output path as the sole argument
    let output = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let config = Config::load_from_path(CONFIG_PATH)
        .with_context(|| format!("loading {CONFIG_PATH}"))?;
    let source = NoaaClient::new().context("building NOAA client")?;
    let display = TideDisplay::new(config, source);

    let now = Local::now().naive_local();
    display.update(now);
    let frame = display.render(0, now);

    let png = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .context("frame buffer did not match its dimensions")?;
    png.save(&output).with_context(|| format!("writing {output}"))?;

    info!(path = %output, "wrote tide chart");
    Ok(())
}
