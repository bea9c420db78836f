//! # Tide Chart Rendering
//!
//! Pure rasterization of a [`TideDataset`] into a [`Frame`]. A render is a
//! function of the dataset and the wall-clock time passed in; nothing here
//! holds state between calls and nothing here performs I/O.
//!
//! ## Chart anatomy
//!
//! The day runs left to right across a 1080 px plot area, one vertical
//! grid line per hour's triple (every 3 hours), heavier lines at midnight
//! and noon. The vertical scale adapts to the day's maximum predicted
//! height through a fixed tier table so the plot always spans roughly the
//! same pixel height whether the station sees 6 ft or 30 ft tides. The
//! whole scale sits one foot above the X axis, so troughs down to -1 ft
//! still render above the bottom line.
//!
//! ## Curve reconstruction
//!
//! Samples arrive every 6 minutes, which works out to 4.5 px of chart per
//! sample. Each consecutive pair is bridged by 5 linearly interpolated
//! one-pixel columns. Because 4.5 px truncates to alternating 4- and
//! 5-pixel spans, the column nearest the previous sample sometimes
//! coincides with the column that span already drew; a last-drawn-column
//! accumulator skips exactly those, so every column between the first and
//! last sample is struck exactly once.

use crate::frame::Frame;
use crate::{TideDataset, TidePrediction};
use chrono::{NaiveDateTime, Timelike};
use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_9X15},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::Text,
};
use tracing::{debug, warn};

/// Rendered image width in pixels.
pub const FRAME_WIDTH: u32 = 1280;
/// Rendered image height in pixels.
pub const FRAME_HEIGHT: u32 = 800;

/// Left edge of the plot area.
pub const ORIGIN_X: i32 = 100;
/// Y coordinate of the X axis (the zero line sits one grid step above it).
pub const ORIGIN_Y: i32 = FRAME_HEIGHT as i32 - 60;

/// One vertical grid segment per hour of the day.
const VERTICAL_GRID_LINE_COUNT: i32 = 24;
/// Pixels per hour.
pub const VERTICAL_GRID_SPACING: i32 = 45;
/// Plot area width: 24 hours at 45 px.
const CHART_WIDTH: i32 = VERTICAL_GRID_LINE_COUNT * VERTICAL_GRID_SPACING;

/// Horizontal pixels assigned to one 6-minute sample (240 samples span
/// the 1080 px day).
pub const SAMPLE_PITCH: f32 = 4.5;
/// Interpolated columns drawn between two consecutive samples.
const INTERP_STEPS: i32 = 5;

/// Background, matching the rest of the slideshow's panels.
pub const BACKGROUND: Rgb888 = Rgb888::new(240, 240, 255);
/// Grid, axis labels and title.
pub const INK: Rgb888 = Rgb888::new(0, 0, 100);
/// Filled tide curve.
pub const CURVE: Rgb888 = Rgb888::new(165, 165, 255);
/// Current-time marker.
pub const MARKER: Rgb888 = Rgb888::new(255, 0, 0);
/// Error-branch text.
pub const ERROR_TEXT: Rgb888 = Rgb888::new(0, 0, 255);

const STATIONS_HELP: &str = "See: https://tidesandcurrents.noaa.gov/stations.html";
const NO_DATA_MESSAGE: &str = "No predictions were returned for today";

/// One row of the vertical scale table: how many one-foot grid lines to
/// draw and how many pixels apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTier {
    pub line_count: i32,
    pub spacing: i32,
}

/// Pick the vertical scale for a day's maximum tide level.
///
/// Every tier spans at least `max_level + 1` feet (the extra foot covers
/// unusually low troughs below the datum) while keeping the total pixel
/// span close to constant, so high-range stations get a denser grid
/// instead of a taller chart.
pub fn grid_tier(max_level: f32) -> GridTier {
    let (line_count, spacing) = if max_level < 8.0 {
        (9, 72) // 648 px
    } else if max_level < 12.0 {
        (13, 50) // 650 px
    } else if max_level < 16.0 {
        (17, 38) // 646 px
    } else if max_level < 20.0 {
        (21, 30) // 630 px
    } else if max_level < 28.0 {
        (29, 22) // 638 px
    } else {
        (41, 16) // 656 px
    };
    GridTier {
        line_count,
        spacing,
    }
}

/// Label every foot when the grid is roomy, every other foot when dense.
pub fn label_step(tier: GridTier) -> i32 {
    if tier.spacing < 32 {
        2
    } else {
        1
    }
}

/// Day's maximum predicted level, floored at zero so a day of all-negative
/// predictions still gets the smallest tier rather than a degenerate one.
pub fn max_level(samples: &[TidePrediction]) -> f32 {
    samples
        .iter()
        .map(|s| s.height_ft)
        .fold(0.0, |max, h| if h > max { h } else { max })
}

/// 12-hour label for an hour-of-day grid position.
fn hour_label(hour: i32) -> String {
    if hour == 0 || hour == 24 {
        "12 AM".to_string()
    } else if hour > 12 {
        (hour - 12).to_string()
    } else {
        hour.to_string()
    }
}

/// X pixel of the current-time marker.
pub fn marker_x(now: NaiveDateTime) -> i32 {
    let minutes_today = (now.hour() * 60 + now.minute()) as i32;
    ORIGIN_X + (VERTICAL_GRID_SPACING * minutes_today) / 60
}

/// The interpolated columns bridging one consecutive sample pair.
///
/// `x` is the current sample's column; the span covers the 5 columns
/// `x-4 ..= x` with heights stepped linearly from `prev_level` toward
/// `level`. A column equal to `recent_x` (the last column the previous
/// span drew) is skipped. Returns the columns to draw and the new
/// accumulator value.
fn span_columns(
    prev_level: f32,
    level: f32,
    x: i32,
    recent_x: i32,
) -> (Vec<(i32, f32)>, i32) {
    let step = (prev_level - level) / INTERP_STEPS as f32;
    let mut columns = Vec::with_capacity(INTERP_STEPS as usize);
    for k in 1..=INTERP_STEPS {
        let column = x - (INTERP_STEPS - k);
        if column == recent_x {
            continue;
        }
        columns.push((column, prev_level - step * k as f32));
    }
    (columns, x)
}

/// Renders the cached dataset into a fixed-size frame.
///
/// Holds only the two label strings from the configuration; every render
/// is otherwise a pure function of its arguments.
pub struct ChartRenderer {
    friendly_name: String,
    station_id: String,
}

impl ChartRenderer {
    pub fn new(friendly_name: String, station_id: String) -> Self {
        ChartRenderer {
            friendly_name,
            station_id,
        }
    }

    /// Render the dataset as of `now`. Never fails; problem datasets
    /// degrade to the text-only error layout.
    pub fn render(&self, dataset: &TideDataset, now: NaiveDateTime) -> Frame {
        let mut frame = Frame::new(FRAME_WIDTH, FRAME_HEIGHT, BACKGROUND);
        match dataset {
            TideDataset::Error(message) => self.draw_error(&mut frame, message),
            TideDataset::Predictions(samples) if samples.is_empty() => {
                self.draw_error(&mut frame, NO_DATA_MESSAGE)
            }
            TideDataset::Predictions(samples) => self.draw_chart(&mut frame, samples, now),
        }
        frame
    }

    /// Text-only layout for fetch and service failures: the station id so
    /// a misconfigured panel is diagnosable from across the room, the
    /// message itself, and where to look up a working station.
    fn draw_error(&self, frame: &mut Frame, message: &str) {
        let style = MonoTextStyle::new(&FONT_10X20, ERROR_TEXT);
        let station_line = format!("Station: {}", self.station_id);

        draw_centered(frame, &station_line, 200, style);
        draw_centered(frame, message, 250, style);
        draw_centered(frame, STATIONS_HELP, 300, style);
    }

    fn draw_chart(&self, frame: &mut Frame, samples: &[TidePrediction], now: NaiveDateTime) {
        let tier = grid_tier(max_level(samples));
        debug!(
            samples = samples.len(),
            line_count = tier.line_count,
            spacing = tier.spacing,
            "rendering tide chart"
        );

        self.draw_title(frame, samples);
        draw_y_labels(frame, tier);
        draw_x_labels(frame);
        draw_vertical_grid(frame, tier);
        draw_horizontal_grid(frame, tier);
        draw_curve(frame, samples, tier);
        draw_time_marker(frame, tier, now);
    }

    fn draw_title(&self, frame: &mut Frame, samples: &[TidePrediction]) {
        let style = MonoTextStyle::new(&FONT_10X20, INK);
        Text::new(&self.friendly_name, Point::new(160, 60), style)
            .draw(frame)
            .ok();

        // Date of the plotted predictions in the upper right, from the
        // first sample's timestring; skipped if it does not parse.
        if let Some(first) = samples.first() {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&first.time, "%Y-%m-%d %H:%M") {
                let date = parsed.format("%b %-d, %Y").to_string();
                let x = FRAME_WIDTH as i32 - 60 - text_width(&date, &FONT_10X20);
                Text::new(&date, Point::new(x, 60), style).draw(frame).ok();
            }
        }
    }
}

// -- Grid, labels, curve --

fn draw_y_labels(frame: &mut Frame, tier: GridTier) {
    let style = MonoTextStyle::new(&FONT_9X15, INK);

    // Bottom line is one foot below the datum
    Text::new("-1", Point::new(ORIGIN_X - 50, ORIGIN_Y + 10), style)
        .draw(frame)
        .ok();

    // Feet count up from the line one spacing above the axis
    let step = label_step(tier);
    let mut foot = 0;
    while foot < tier.line_count {
        let label = foot.to_string();
        let y = ORIGIN_Y + 10 - (foot + 1) * tier.spacing;
        Text::new(&label, Point::new(ORIGIN_X - 50, y), style)
            .draw(frame)
            .ok();
        foot += step;
    }
}

fn draw_x_labels(frame: &mut Frame) {
    let style = MonoTextStyle::new(&FONT_9X15, INK);
    for hour in (0..=24).step_by(3) {
        let label = hour_label(hour);
        let x = ORIGIN_X + hour * VERTICAL_GRID_SPACING - text_width(&label, &FONT_9X15) / 2;
        Text::new(&label, Point::new(x, ORIGIN_Y + 40), style)
            .draw(frame)
            .ok();
    }
}

fn draw_vertical_grid(frame: &mut Frame, tier: GridTier) {
    let top = ORIGIN_Y - tier.line_count * tier.spacing;
    let light = PrimitiveStyle::with_stroke(INK, 1);
    let heavy = PrimitiveStyle::with_stroke(INK, 3);

    for hour in (0..=VERTICAL_GRID_LINE_COUNT).step_by(3) {
        let x = ORIGIN_X + hour * VERTICAL_GRID_SPACING;
        Line::new(Point::new(x, ORIGIN_Y), Point::new(x, top))
            .into_styled(light)
            .draw(frame)
            .ok();
    }

    // Midnight, noon, midnight again
    for hour in [0, 12, 24] {
        let x = ORIGIN_X + hour * VERTICAL_GRID_SPACING;
        Line::new(Point::new(x, ORIGIN_Y), Point::new(x, top))
            .into_styled(heavy)
            .draw(frame)
            .ok();
    }
}

fn draw_horizontal_grid(frame: &mut Frame, tier: GridTier) {
    let light = PrimitiveStyle::with_stroke(INK, 1);
    let heavy = PrimitiveStyle::with_stroke(INK, 3);

    for line in 0..=tier.line_count {
        let y = ORIGIN_Y - line * tier.spacing;
        Line::new(Point::new(ORIGIN_X, y), Point::new(ORIGIN_X + CHART_WIDTH, y))
            .into_styled(light)
            .draw(frame)
            .ok();
    }

    // Bottom, the zero-foot line above it, and the top
    for line in [0, 1, tier.line_count] {
        let y = ORIGIN_Y - line * tier.spacing;
        Line::new(Point::new(ORIGIN_X, y), Point::new(ORIGIN_X + CHART_WIDTH, y))
            .into_styled(heavy)
            .draw(frame)
            .ok();
    }
}

fn draw_curve(frame: &mut Frame, samples: &[TidePrediction], tier: GridTier) {
    // A malformed sample aborts the curve; the grid has already been drawn
    // so the panel still shows an empty chart rather than garbage.
    if samples.iter().any(|s| !s.height_ft.is_finite()) {
        warn!("non-finite tide height in dataset; skipping curve");
        return;
    }

    let mut recent_x = 0;
    let mut prev_level = 0.0f32;

    for (i, sample) in samples.iter().enumerate() {
        // One foot of headroom below the datum, scaled to pixels
        let level = (sample.height_ft + 1.0) * tier.spacing as f32;
        let x = ORIGIN_X + (i as f32 * SAMPLE_PITCH) as i32;

        if i == 0 {
            // No prior point to interpolate from
            draw_bar(frame, x, level);
            recent_x = x;
        } else {
            let (columns, next_recent) = span_columns(prev_level, level, x, recent_x);
            for (column, column_level) in columns {
                draw_bar(frame, column, column_level);
            }
            recent_x = next_recent;
        }
        prev_level = level;
    }

    // No sample exists for midnight at the end of the day; hold the last
    // height flat across the remaining columns to the right edge.
    let x_end = ORIGIN_X + (samples.len() as f32 * SAMPLE_PITCH) as i32;
    for column in (x_end - 4)..=x_end {
        draw_bar(frame, column, prev_level);
    }
}

/// One one-pixel-wide column of the filled curve, from the axis up to the
/// interpolated height.
fn draw_bar(frame: &mut Frame, x: i32, level: f32) {
    Line::new(
        Point::new(x, ORIGIN_Y),
        Point::new(x, ORIGIN_Y - level as i32),
    )
    .into_styled(PrimitiveStyle::with_stroke(CURVE, 1))
    .draw(frame)
    .ok();
}

fn draw_time_marker(frame: &mut Frame, tier: GridTier, now: NaiveDateTime) {
    let x = marker_x(now);
    let top = ORIGIN_Y - tier.line_count * tier.spacing;
    Line::new(Point::new(x, ORIGIN_Y), Point::new(x, top))
        .into_styled(PrimitiveStyle::with_stroke(MARKER, 4))
        .draw(frame)
        .ok();
}

fn text_width(text: &str, font: &MonoFont) -> i32 {
    text.len() as i32 * font.character_size.width as i32
}

fn draw_centered(frame: &mut Frame, text: &str, y: i32, style: MonoTextStyle<'_, Rgb888>) {
    let x = (FRAME_WIDTH as i32 - text_width(text, style.font)) / 2;
    Text::new(text, Point::new(x, y), style).draw(frame).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn renderer() -> ChartRenderer {
        ChartRenderer::new("Onset, MA".to_string(), "8447270".to_string())
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 11)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn sample(height_ft: f32) -> TidePrediction {
        TidePrediction {
            time: "2021-07-11 00:00".to_string(),
            height_ft,
        }
    }

    #[test]
    fn test_grid_tier_table() {
        let cases = [
            (0.0, 9, 72),
            (7.9, 9, 72),
            (8.0, 13, 50),
            (11.9, 13, 50),
            (16.0, 21, 30),
            (19.9, 21, 30),
            (27.9, 29, 22),
            (30.0, 41, 16),
        ];
        for (max, line_count, spacing) in cases {
            let tier = grid_tier(max);
            assert_eq!(
                (tier.line_count, tier.spacing),
                (line_count, spacing),
                "tier for max level {max}"
            );
        }
    }

    #[test]
    fn test_grid_tier_span_is_roughly_constant() {
        // Sweep the whole plausible range; the chart must always span at
        // least max+1 feet and stay within the fixed pixel band.
        let mut level = 0.0f32;
        while level < 60.0 {
            let tier = grid_tier(level);
            let span = tier.line_count * tier.spacing;
            assert!(
                (600..=660).contains(&span),
                "span {span} out of band at level {level}"
            );
            assert!(
                tier.line_count as f32 >= level.min(40.0) + 1.0,
                "tier too short at level {level}"
            );
            level += 0.1;
        }
    }

    #[test]
    fn test_label_step_follows_spacing() {
        assert_eq!(label_step(grid_tier(5.0)), 1); // 72 px
        assert_eq!(label_step(grid_tier(10.0)), 1); // 50 px
        assert_eq!(label_step(grid_tier(14.0)), 1); // 38 px
        assert_eq!(label_step(grid_tier(18.0)), 2); // 30 px
        assert_eq!(label_step(grid_tier(35.0)), 2); // 16 px
    }

    #[test]
    fn test_max_level_floors_at_zero() {
        assert_eq!(max_level(&[sample(-2.0), sample(-0.5)]), 0.0);
        assert_eq!(max_level(&[sample(1.0), sample(9.4)]), 9.4);
        assert_eq!(max_level(&[]), 0.0);
    }

    #[test]
    fn test_hour_labels_wrap_at_noon() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(3), "3");
        assert_eq!(hour_label(12), "12");
        assert_eq!(hour_label(15), "3");
        assert_eq!(hour_label(21), "9");
        assert_eq!(hour_label(24), "12 AM");
    }

    #[test]
    fn test_span_columns_interpolate_linearly() {
        // Two samples 10 px apart climbing 0 -> 50
        let (columns, recent) = span_columns(0.0, 50.0, 10, 0);
        assert_eq!(recent, 10);
        let expected = [(6, 10.0), (7, 20.0), (8, 30.0), (9, 40.0), (10, 50.0)];
        assert_eq!(columns.len(), 5);
        for ((column, level), (want_col, want_level)) in columns.iter().zip(expected) {
            assert_eq!(*column, want_col);
            assert!((level - want_level).abs() < 1e-4);
        }
    }

    #[test]
    fn test_span_columns_skip_already_drawn_column() {
        // Previous span ended at column 9; a 4-px span starting there must
        // not strike column 9 again.
        let (columns, recent) = span_columns(50.0, 10.0, 13, 9);
        assert_eq!(recent, 13);
        let drawn: Vec<i32> = columns.iter().map(|(c, _)| *c).collect();
        assert_eq!(drawn, vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_full_day_covers_every_column_exactly_once() {
        // Walk the column bookkeeping for a full 240-sample day and check
        // the plot is contiguous with no double strikes.
        let mut struck = Vec::new();
        let mut recent_x = 0;
        let mut spans = 0;
        for i in 0..240 {
            let x = ORIGIN_X + (i as f32 * SAMPLE_PITCH) as i32;
            if i == 0 {
                struck.push(x);
                recent_x = x;
            } else {
                let (columns, next) = span_columns(1.0, 2.0, x, recent_x);
                spans += 1;
                struck.extend(columns.iter().map(|(c, _)| *c));
                recent_x = next;
            }
        }

        assert_eq!(spans, 239);
        let first = ORIGIN_X;
        let last = ORIGIN_X + (239.0 * SAMPLE_PITCH) as i32;
        assert_eq!(struck.len(), (last - first + 1) as usize);

        let mut sorted = struck.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), struck.len(), "a column was struck twice");
        assert_eq!(*sorted.first().unwrap(), first);
        assert_eq!(*sorted.last().unwrap(), last);
    }

    #[test]
    fn test_marker_x_at_half_past_two() {
        assert_eq!(marker_x(at(14, 30)), ORIGIN_X + (45 * 870) / 60);
        assert_eq!(marker_x(at(0, 0)), ORIGIN_X);
    }

    #[test]
    fn test_error_branch_has_text_but_no_grid() {
        let dataset = TideDataset::Error("No data was found".to_string());
        let frame = renderer().render(&dataset, at(12, 0));

        // Nothing on the axis row where the grid would be
        for x in ORIGIN_X..(ORIGIN_X + CHART_WIDTH) {
            assert_eq!(frame.pixel(x as u32, ORIGIN_Y as u32), Some(BACKGROUND));
        }

        // The message band does contain drawn text
        let mut ink_pixels = 0;
        for y in 180..320u32 {
            for x in 0..FRAME_WIDTH {
                if frame.pixel(x, y) == Some(ERROR_TEXT) {
                    ink_pixels += 1;
                }
            }
        }
        assert!(ink_pixels > 0, "error text was not drawn");
    }

    #[test]
    fn test_empty_predictions_use_error_branch() {
        let frame = renderer().render(&TideDataset::empty(), at(12, 0));
        for x in ORIGIN_X..(ORIGIN_X + CHART_WIDTH) {
            assert_eq!(frame.pixel(x as u32, ORIGIN_Y as u32), Some(BACKGROUND));
        }
    }

    #[test]
    fn test_non_finite_sample_aborts_curve_but_keeps_grid() {
        let dataset = TideDataset::Predictions(vec![
            sample(2.0),
            sample(f32::NAN),
            sample(3.0),
        ]);
        let frame = renderer().render(&dataset, at(12, 0));

        // Grid drawn
        assert_eq!(
            frame.pixel((ORIGIN_X + 5) as u32, ORIGIN_Y as u32),
            Some(INK)
        );

        // No curve anywhere
        for y in 0..FRAME_HEIGHT {
            for x in 0..FRAME_WIDTH {
                assert_ne!(frame.pixel(x, y), Some(CURVE));
            }
        }
    }

    #[test]
    fn test_data_branch_draws_grid_curve_and_marker() {
        let samples: Vec<TidePrediction> = (0..240).map(|_| sample(3.0)).collect();
        let frame = renderer().render(&TideDataset::Predictions(samples), at(14, 30));
        let tier = grid_tier(3.0);

        // Heavy top grid line
        let top = (ORIGIN_Y - tier.line_count * tier.spacing) as u32;
        assert_eq!(frame.pixel((ORIGIN_X + 5) as u32, top), Some(INK));

        // Flat curve at (3 + 1) * 72 px above the axis; probe just below it
        let level = (4.0 * tier.spacing as f32) as i32;
        let probe_y = (ORIGIN_Y - level + 2) as u32;
        assert_eq!(frame.pixel((ORIGIN_X + 50) as u32, probe_y), Some(CURVE));

        // Marker near 14:30
        let expected_x = marker_x(at(14, 30));
        let mut found = false;
        for x in (expected_x - 4)..=(expected_x + 4) {
            if frame.pixel(x as u32, (ORIGIN_Y - 10) as u32) == Some(MARKER) {
                found = true;
            }
        }
        assert!(found, "current-time marker missing near x={expected_x}");
    }
}
