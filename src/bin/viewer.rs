use eframe::egui;
use rusty_latte::config::Settings;
use rusty_latte::logging;
use rusty_latte::viewer::LatteApp;

fn main() -> eframe::Result {
    dotenvy::dotenv().ok();
    logging::init(logging::level_for(1, false));

    let settings = Settings::load(None).unwrap_or_else(|e| {
        log::error!("{e}; using default settings");
        Settings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Latte – Menu Nutrition Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(LatteApp::new(settings)))),
    )
}
