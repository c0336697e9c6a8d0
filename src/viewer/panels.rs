use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::state::{AppState, Side, View};
use crate::data::export::format_value;
use crate::data::model::Nutrient;
use crate::metrics::{ColumnStats, Stats};
use crate::narrate::SummarySource;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for side in Side::ALL {
                if ui.button(format!("Open {}…", side.label())).clicked() {
                    open_file_dialog(state, side);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        for side in Side::ALL {
            if let Some(ds) = state.dataset(side) {
                ui.label(format!(
                    "{}: {} items, {} visible",
                    side.label(),
                    ds.table.len(),
                    ds.visible.len()
                ));
                ui.separator();
            }
        }

        ui.selectable_value(&mut state.view, View::Table, "Table");
        ui.selectable_value(&mut state.view, View::Stats, "Stats");
        ui.selectable_value(&mut state.view, View::Charts, "Charts");
        ui.selectable_value(&mut state.view, View::Summary, "Summary");

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let c = &mut state.criteria;
            changed |= threshold(ui, "Calories ≤", &mut c.calories_le, 300.0);
            changed |= threshold(ui, "Sugar (g) ≤", &mut c.sugar_g_le, 30.0);
            changed |= threshold(ui, "Fat (g) ≤", &mut c.fat_g_le, 10.0);
            changed |= threshold(ui, "Protein (g) ≥", &mut c.protein_g_ge, 5.0);
            changed |= threshold(ui, "Sodium (mg) ≤", &mut c.sodium_le, 300.0);
            changed |= threshold(ui, "Caffeine (mg) >", &mut c.caffeine_gt, 0.0);

            ui.add_space(4.0);
            ui.strong("Name contains");
            let mut text = c.name_contains.clone().unwrap_or_default();
            if ui.text_edit_singleline(&mut text).changed() {
                c.name_contains = (!text.trim().is_empty()).then_some(text);
                changed = true;
            }

            ui.add_space(4.0);
            if ui.button("Clear filters").clicked() {
                state.clear_filters();
            }

            ui.separator();
            ui.strong("Chart");
            egui::ComboBox::from_id_salt("chart_nutrient")
                .selected_text(state.chart_nutrient.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for n in Nutrient::ALL {
                        ui.selectable_value(&mut state.chart_nutrient, n, n.label());
                    }
                });
            ui.add(egui::Slider::new(&mut state.top_n, 1..=25).text("top N"));
        });

    // Recompute visible rows after any threshold change.
    if changed {
        state.refilter();
    }
}

/// An optional threshold: a checkbox enabling a drag value.
fn threshold(ui: &mut Ui, label: &str, value: &mut Option<f64>, default: f64) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = value.is_some();
        if ui.checkbox(&mut enabled, label).changed() {
            *value = enabled.then_some(value.unwrap_or(default));
            changed = true;
        }
        if let Some(v) = value {
            changed |= ui
                .add(DragValue::new(v).speed(1.0).range(0.0..=f64::MAX))
                .changed();
        }
    });
    changed
}

// ---------------------------------------------------------------------------
// Central views
// ---------------------------------------------------------------------------

pub fn items_table(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for side in Side::ALL {
            ui.selectable_value(&mut state.active, side, side.label());
        }
    });

    let Some(ds) = state.dataset(state.active) else {
        empty_hint(ui);
        return;
    };
    let columns: Vec<Nutrient> = ds.table.source_columns.iter().copied().collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(180.0))
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Item");
            });
            for n in &columns {
                header.col(|ui| {
                    ui.strong(n.key());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, ds.visible.len(), |mut row| {
                let item = &ds.table.items[ds.visible[row.index()]];
                row.col(|ui| {
                    ui.label(&item.name);
                });
                for &n in &columns {
                    row.col(|ui| {
                        ui.label(item.get(n).map(format_value).unwrap_or_default());
                    });
                }
            });
        });
}

pub fn stats_view(ui: &mut Ui, state: &AppState) {
    if state.drinks.is_none() && state.food.is_none() {
        empty_hint(ui);
        return;
    }
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        for side in Side::ALL {
            if let Some(ds) = state.dataset(side) {
                ui.heading(format!("{} ({} items)", side.label(), ds.stats.count));
                stats_grid(ui, side.label(), &ds.stats);
                ui.add_space(8.0);
            }
        }

        let Some(cmp) = &state.comparison else {
            return;
        };
        ui.heading("Comparison (drinks − food)");
        if cmp.uses_sugar_proxy() {
            ui.label(RichText::new("Sugar not provided; carbohydrates used as proxy.").italics());
        }
        egui::Grid::new("comparison_grid").striped(true).show(ui, |ui: &mut Ui| {
            ui.strong("Mean");
            ui.strong("drinks");
            ui.strong("food");
            ui.strong("difference");
            ui.end_row();
            for (n, d) in &cmp.nutrients {
                ui.label(n.label());
                ui.label(format!("{:.2}", d.a));
                ui.label(format!("{:.2}", d.b));
                ui.label(format!("{:+.2}", d.difference));
                ui.end_row();
            }
            if let Some(s) = &cmp.sugar {
                let mark = |proxy: bool| if proxy { " *" } else { "" };
                ui.label("Sugar (* = carbs)");
                ui.label(format!("{:.2}{}", s.a, mark(s.a_proxy)));
                ui.label(format!("{:.2}{}", s.b, mark(s.b_proxy)));
                ui.label(format!("{:+.2}", s.difference));
                ui.end_row();
            }
        });
        if let Some(largest) = &cmp.largest_difference {
            ui.label(format!(
                "Largest difference: {} ({:.2})",
                largest.metric.label(),
                largest.abs_difference
            ));
        }

        if !state.extremes.is_empty() {
            ui.add_space(8.0);
            ui.heading("Extremes");
            extremes_grid(ui, state);
        }
    });
}

fn extremes_grid(ui: &mut Ui, state: &AppState) {
    egui::Grid::new("extremes_grid").striped(true).show(ui, |ui: &mut Ui| {
        ui.strong("");
        ui.strong("drinks");
        ui.strong("food");
        ui.end_row();
        for extreme in &state.extremes {
            ui.label(extreme.label());
            for side in [&extreme.drinks, &extreme.food] {
                match side {
                    Some(item) => ui.label(format!("{} ({})", item.name, format_value(item.value))),
                    None => ui.weak("–"),
                };
            }
            ui.end_row();
        }
    });
}

fn stats_grid(ui: &mut Ui, id: &str, stats: &Stats) {
    egui::Grid::new(("stats_grid", id)).striped(true).show(ui, |ui: &mut Ui| {
        for head in ["Column", "count", "mean", "median", "min", "max"] {
            ui.strong(head);
        }
        ui.end_row();
        for (n, col) in &stats.columns {
            if col.count == 0 {
                continue;
            }
            ui.label(n.label());
            ui.label(col.count.to_string());
            for v in stat_cells(col) {
                ui.label(v);
            }
            ui.end_row();
        }
    });
    if let Some(ratio) = stats.fat_to_protein_ratio {
        ui.label(format!("Fat-to-protein ratio: {ratio:.2}"));
    }
}

fn stat_cells(col: &ColumnStats) -> [String; 4] {
    [col.mean, col.median, col.min, col.max].map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default())
}

pub fn summary_view(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let ready = state.drinks.is_some() && state.food.is_some();
        let button = ui.add_enabled(
            ready && !state.summary.is_pending(),
            egui::Button::new("Summarize"),
        );
        if button.clicked() {
            state.request_summary();
        }
        if state.summary.is_pending() {
            ui.spinner();
        }
    });

    if let Some(err) = &state.summary.error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
    if state.summary.source == Some(SummarySource::Stale) {
        ui.label(RichText::new("Request failed; showing the last saved summary.").italics());
    }
    if let Some(text) = &state.summary.text {
        ScrollArea::vertical().show(ui, |ui: &mut Ui| {
            ui.label(text);
        });
    }
}

pub fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a menu file to begin  (File → Open drinks…)");
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, side: Side) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {} menu", side.label()))
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(side, &path);
    }
}
