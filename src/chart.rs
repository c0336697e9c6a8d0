//! PNG bar charts drawn with plotters into an RGB buffer and encoded
//! with `image`.
//!
//! Text uses the Ubuntu-Light face that egui bundles, registered with
//! plotters once per process under the `sans-serif` family.

use std::borrow::Cow;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use eframe::egui::FontDefinitions;
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::color::{generate_palette, ColorMap, Rgb8};
use crate::data::model::{MenuTable, Nutrient};
use crate::error::ChartError;
use crate::metrics::rank::RankedItem;
use crate::metrics::{describe, extremes, top_n, Stats};

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

const FONT_FAMILY: &str = "sans-serif";
const BUNDLED_FONT: &str = "Ubuntu-Light";
const SIDES: [&str; 2] = ["drinks", "food"];
const MAX_LABEL_CHARS: usize = 18;

type DrawResult = Result<(), Box<dyn Error>>;

/// Bar chart of the top `n` items by `nutrient`. Returns the written path.
pub fn bar_top_items(
    table: &MenuTable,
    nutrient: Nutrient,
    n: usize,
    out_path: &Path,
) -> Result<PathBuf, ChartError> {
    let ranked = top_n(table, nutrient, n);
    let bars: Vec<(String, f64)> = ranked
        .iter()
        .filter_map(|it| Some((shorten(&it.name), it.get(nutrient)?)))
        .collect();
    if bars.is_empty() {
        return Err(ChartError::Empty(format!("no values for {nutrient}")));
    }

    let title = format!("Top {} by {}", bars.len(), nutrient.key());
    render(out_path, |root| {
        let labels: Vec<String> = bars.iter().map(|(name, _)| name.clone()).collect();
        let mut chart = ChartBuilder::on(root)
            .caption(&title, (FONT_FAMILY, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(slot_range(bars.len()), value_range(bars.iter().map(|b| b.1)))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|x| label_at(&labels, *x))
            .x_desc("Item")
            .y_desc(nutrient.label())
            .label_style((FONT_FAMILY, 14))
            .draw()?;

        let colours = generate_palette(bars.len());
        chart.draw_series(bars.iter().zip(colours).enumerate().map(|(i, ((_, v), rgb))| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *v)], colour(rgb).filled())
        }))?;
        Ok(())
    })
}

/// Grouped bars comparing the mean of each nutrient in `drinks` and `food`.
///
/// `sugar_g` reads the carbs proxy when a table has no sugar values; a
/// nutrient without a mean leaves an empty slot.
pub fn grouped_means_bar(
    drinks: &MenuTable,
    food: &MenuTable,
    nutrients: &[Nutrient],
    out_path: &Path,
) -> Result<PathBuf, ChartError> {
    let stats = [describe(drinks), describe(food)];
    let groups: Vec<(String, [Option<f64>; 2])> = nutrients
        .iter()
        .map(|&n| (n.key().to_string(), [chart_mean(&stats[0], n), chart_mean(&stats[1], n)]))
        .collect();
    grouped_bar(
        "Mean per item: drinks vs food",
        "Nutrient",
        "Mean per item",
        &groups,
        out_path,
    )
}

/// Highest calories, fat and carbs value on each side.
pub fn extremes_bar(
    drinks: &MenuTable,
    food: &MenuTable,
    out_path: &Path,
) -> Result<PathBuf, ChartError> {
    let groups: Vec<(String, [Option<f64>; 2])> = extremes(drinks, food)
        .iter()
        .map(|e| {
            let value = |side: &Option<RankedItem>| side.as_ref().map(|it| it.value);
            (e.label(), [value(&e.drinks), value(&e.food)])
        })
        .collect();
    grouped_bar("Extremes Comparisons", "Category", "Value", &groups, out_path)
}

fn chart_mean(stats: &Stats, nutrient: Nutrient) -> Option<f64> {
    if nutrient == Nutrient::SugarG {
        stats.sugar().and_then(|s| s.mean)
    } else {
        stats.mean(nutrient)
    }
}

/// Two bars (drinks, food) per group with a legend.
fn grouped_bar(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    groups: &[(String, [Option<f64>; 2])],
    out_path: &Path,
) -> Result<PathBuf, ChartError> {
    let present: Vec<f64> = groups.iter().flat_map(|(_, pair)| pair.iter().flatten().copied()).collect();
    if present.is_empty() {
        return Err(ChartError::Empty(format!("no values for {title}")));
    }

    render(out_path, |root| {
        let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT_FAMILY, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(slot_range(groups.len()), value_range(present.iter().copied()))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups.len())
            .x_label_formatter(&|x| label_at(&labels, *x))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style((FONT_FAMILY, 14))
            .draw()?;

        let colours = ColorMap::new(&SIDES);
        for (side, (name, rgb)) in colours.legend_entries().into_iter().enumerate() {
            let fill = colour(rgb);
            let offset = if side == 0 { -0.38 } else { 0.02 };
            chart
                .draw_series(groups.iter().enumerate().filter_map(|(i, (_, pair))| {
                    let v = pair[side]?;
                    let x = i as f64 + offset;
                    Some(Rectangle::new([(x, 0.0), (x + 0.36, v)], fill.filled()))
                }))?
                .label(name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], fill.filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, 16))
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw onto a white canvas, then encode the buffer as PNG at `path`.
fn render<F>(path: &Path, draw: F) -> Result<PathBuf, ChartError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>) -> DrawResult,
{
    register_bundled_font()?;

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        draw(&root).map_err(|e| ChartError::Draw(e.to_string()))?;
        root.present().map_err(draw_err)?;
    }
    let img = RgbImage::from_raw(WIDTH, HEIGHT, buf)
        .ok_or_else(|| ChartError::Draw("pixel buffer has the wrong size".to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ChartError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| ChartError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("saved plot to {}", path.display());
    Ok(path.to_path_buf())
}

fn draw_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(e.to_string())
}

fn register_bundled_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            let fonts = FontDefinitions::default();
            let bytes = fonts
                .font_data
                .get(BUNDLED_FONT)
                .and_then(|data| match &data.font {
                    Cow::Borrowed(bytes) => Some(*bytes),
                    Cow::Owned(_) => None,
                })
                .ok_or_else(|| format!("font {BUNDLED_FONT} is not bundled"))?;
            register_font(FONT_FAMILY, FontStyle::Normal, bytes)
                .map_err(|_| format!("font {BUNDLED_FONT} could not be parsed"))
        })
        .clone()
        .map_err(ChartError::Font)
}

fn colour(rgb: Rgb8) -> RGBColor {
    RGBColor(rgb[0], rgb[1], rgb[2])
}

/// One unit per slot, centred on the slot index.
fn slot_range(slots: usize) -> std::ops::Range<f64> {
    -0.5..slots as f64 - 0.5
}

/// Zero to the largest value plus headroom for the legend.
fn value_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let max = values.fold(0.0_f64, f64::max);
    let top = if max > 0.0 { max * 1.15 } else { 1.0 };
    0.0..top
}

/// Tick label for slot `x`; ticks between slots stay blank.
fn label_at(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn shorten(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
    short.push('…');
    short
}
