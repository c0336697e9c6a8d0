use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use super::state::{AppState, Side};
use crate::color::{generate_palette, ColorMap, Rgb8};
use crate::data::model::Nutrient;
use crate::metrics::top_n;

/// Nutrients shown in the grouped means chart.
const MEAN_NUTRIENTS: [Nutrient; 5] = [
    Nutrient::Calories,
    Nutrient::SugarG,
    Nutrient::FatG,
    Nutrient::ProteinG,
    Nutrient::Sodium,
];

fn color32(rgb: Rgb8) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, state: &AppState) {
    let half = ui.available_height() / 2.0 - 8.0;
    top_items_chart(ui, state, half);
    ui.separator();
    means_chart(ui, state, half);
}

/// Top-N items of the active dataset by the chosen nutrient.
fn top_items_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let Some(ds) = state.dataset(state.active) else {
        return;
    };
    let nutrient = ds.table.resolve_column(state.chart_nutrient);
    let ranked = top_n(&ds.visible_table(), nutrient, state.top_n);
    ui.strong(format!("Top {} {} by {}", ranked.len(), state.active.label(), nutrient.label()));
    if ranked.is_empty() {
        ui.label(format!("No {} values in the visible rows.", nutrient.label()));
        return;
    }

    let colours = generate_palette(ranked.len());
    let bars: Vec<Bar> = ranked
        .iter()
        .zip(colours)
        .enumerate()
        .filter_map(|(i, (item, rgb))| {
            let value = item.get(nutrient)?;
            Some(Bar::new(i as f64, value).name(&item.name).fill(color32(rgb)))
        })
        .collect();

    Plot::new("top_items_plot")
        .height(height)
        .y_axis_label(nutrient.label())
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });
}

/// Grouped means of drinks and food. The sugar group reads carbs for a
/// table without sugar values.
fn means_chart(ui: &mut Ui, state: &AppState, height: f32) {
    ui.strong("Mean per item: drinks vs food");
    let colours = ColorMap::new(&["drinks", "food"]);

    let charts: Vec<BarChart> = Side::ALL
        .iter()
        .enumerate()
        .filter_map(|(offset, &side)| {
            let stats = &state.dataset(side)?.stats;
            let bars: Vec<Bar> = MEAN_NUTRIENTS
                .iter()
                .enumerate()
                .filter_map(|(i, &n)| {
                    let mean = if n == Nutrient::SugarG {
                        stats.sugar().and_then(|s| s.mean)
                    } else {
                        stats.mean(n)
                    }?;
                    let x = i as f64 + (offset as f64 - 0.5) * 0.4;
                    Some(Bar::new(x, mean).name(n.label()))
                })
                .collect();
            Some(
                BarChart::new(bars)
                    .name(side.label())
                    .color(color32(colours.color_for(side.label())))
                    .width(0.38),
            )
        })
        .collect();

    if charts.is_empty() {
        ui.label("Load drinks or food to compare means.");
        return;
    }

    Plot::new("means_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < f64::EPSILON && i >= 0.0 {
                MEAN_NUTRIENTS
                    .get(i as usize)
                    .map(|n| n.key().to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
