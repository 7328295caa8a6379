// src/renderer.rs

use crate::error::Result;
use crate::font::{self, GLYPH_HEIGHT};
use crate::model::YearMonth;
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, LinSrgb, Srgb};
use std::path::Path;
use tracing::debug;

const HEIGHT: u32 = 600;
const MIN_WIDTH: u32 = 1200;
const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_TOP: u32 = 70;
const MARGIN_BOTTOM: u32 = 60;
/// Narrowest slot that still fits a "MMM YYYY" label.
const MIN_SLOT: u32 = 64;
const Y_TICKS: usize = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([40, 40, 48]);
const GRID: Rgb<u8> = Rgb([225, 225, 232]);

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel geometry of the chart, computed before anything is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub plot_left: u32,
    pub plot_top: u32,
    pub plot_width: u32,
    pub plot_height: u32,
    pub max_count: usize,
    pub bars: Vec<Bar>,
}

impl ChartLayout {
    /// `series` must already be in chronological order.
    pub fn new(series: &[(YearMonth, usize)]) -> Self {
        let slots = series.len().max(1) as u32;
        let width = MIN_WIDTH.max(MARGIN_LEFT + MARGIN_RIGHT + slots * MIN_SLOT);
        let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let slot = plot_width / slots;
        let bar_width = (slot * 7 / 10).max(1);
        let max_count = series.iter().map(|&(_, c)| c).max().unwrap_or(0).max(1);

        let bars = series
            .iter()
            .enumerate()
            .map(|(i, &(month, count))| {
                let height = (count as f64 / max_count as f64 * plot_height as f64).round() as u32;
                Bar {
                    label: month.short_label(),
                    count,
                    x: MARGIN_LEFT + i as u32 * slot + (slot - bar_width) / 2,
                    y: MARGIN_TOP + plot_height - height,
                    width: bar_width,
                    height,
                }
            })
            .collect();

        Self {
            width,
            height: HEIGHT,
            plot_left: MARGIN_LEFT,
            plot_top: MARGIN_TOP,
            plot_width,
            plot_height,
            max_count,
            bars,
        }
    }

    /// Distinct integer tick values from 0 to the tallest bar.
    pub fn y_ticks(&self) -> Vec<usize> {
        let mut ticks: Vec<usize> = (0..=Y_TICKS)
            .map(|i| (self.max_count as f64 * i as f64 / Y_TICKS as f64).round() as usize)
            .collect();
        ticks.dedup();
        ticks
    }

    fn y_for(&self, value: usize) -> u32 {
        let share = value as f64 / self.max_count as f64;
        let offset = (share * self.plot_height as f64).round() as u32;
        self.plot_top + self.plot_height - offset.min(self.plot_height)
    }
}

/// Draws a commits-per-month bar chart and saves it as PNG at `path`.
pub fn render_chart(
    series: &[(YearMonth, usize)],
    title: &str,
    path: &Path,
) -> Result<ChartLayout> {
    let layout = ChartLayout::new(series);
    let mut image = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);

    for tick in layout.y_ticks() {
        let y = layout.y_for(tick);
        fill_rect(&mut image, layout.plot_left, y, layout.plot_width, 1, GRID);
        let label = tick.to_string();
        let x = layout.plot_left.saturating_sub(font::text_width(&label, 1) + 8);
        draw_text(&mut image, &label, x, y.saturating_sub(GLYPH_HEIGHT / 2), 1, INK);
    }

    for bar in &layout.bars {
        let color = intensity_to_color(bar.count as f32 / layout.max_count as f32);
        fill_rect(&mut image, bar.x, bar.y, bar.width, bar.height, color);

        let label_x = (bar.x + bar.width / 2).saturating_sub(font::text_width(&bar.label, 1) / 2);
        let label_y = layout.plot_top + layout.plot_height + 12;
        draw_text(&mut image, &bar.label, label_x, label_y, 1, INK);
    }

    // axes
    let axis_bottom = layout.plot_top + layout.plot_height;
    fill_rect(&mut image, layout.plot_left, layout.plot_top, 1, layout.plot_height + 1, INK);
    fill_rect(&mut image, layout.plot_left, axis_bottom, layout.plot_width, 1, INK);

    let title_x = (layout.width / 2).saturating_sub(font::text_width(title, 2) / 2);
    draw_text(&mut image, title, title_x, 24, 2, INK);
    draw_text(&mut image, "COMMITS", 12, layout.plot_top - 20, 1, INK);
    let month_x = layout.width - MARGIN_RIGHT - font::text_width("MONTH", 1);
    draw_text(&mut image, "MONTH", month_x, axis_bottom + 36, 1, INK);

    image.save(path)?;
    debug!("chart with {} bars written to {}", layout.bars.len(), path.display());
    Ok(layout)
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}

fn draw_text(image: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let (w, h) = image.dimensions();
    font::rasterize(text, x, y, scale, |px, py| {
        if px < w && py < h {
            image.put_pixel(px, py, color);
        }
    });
}

// Blue for the quiet months through to orange for the busiest
fn intensity_to_color(intensity: f32) -> Rgb<u8> {
    let gradient_stops: Vec<LinSrgb<f32>> = [
        Lch::new(45.0f32, 45.0f32, 260.0f32),
        Lch::new(60.0f32, 40.0f32, 200.0f32),
        Lch::new(75.0f32, 80.0f32, 50.0f32),
    ]
    .into_iter()
    .map(LinSrgb::from_color)
    .collect();

    let scaled_pos = intensity.clamp(0.0, 1.0) * (gradient_stops.len() - 1) as f32;
    let idx1 = scaled_pos.floor() as usize;
    let idx2 = (idx1 + 1).min(gradient_stops.len() - 1);
    let t = scaled_pos.fract();

    let c1 = gradient_stops[idx1];
    let c2 = gradient_stops[idx2];
    let mixed = LinSrgb::new(
        c1.red + (c2.red - c1.red) * t,
        c1.green + (c2.green - c1.green) * t,
        c1.blue + (c2.blue - c1.blue) * t,
    );

    let srgb: Srgb<f32> = Srgb::from_linear(mixed);
    let (r, g, b) = srgb.into_components();
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}
