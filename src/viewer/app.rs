use std::time::Duration;

use eframe::egui;

use super::state::{AppState, View};
use super::{panels, plot};
use crate::config::Settings;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LatteApp {
    pub state: AppState,
}

impl LatteApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for LatteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.summary.poll();
        if self.state.summary.is_pending() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Table => panels::items_table(ui, &mut self.state),
            View::Stats => panels::stats_view(ui, &self.state),
            View::Charts => plot::charts(ui, &self.state),
            View::Summary => panels::summary_view(ui, &mut self.state),
        });
    }
}
