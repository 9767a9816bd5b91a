use std::path::PathBuf;

use anyhow::anyhow;
use eframe::egui;

use wall_sketch::gui::SketchApp;
use wall_sketch::logging;
use wall_sketch::settings::{Settings, DEFAULT_SETTINGS_FILE};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(DEFAULT_SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));
    tracing::info!(settings = DEFAULT_SETTINGS_FILE, "starting sketch window");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size())
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Wall Sketch",
        native_options,
        Box::new(move |_cc| Box::new(SketchApp::new(settings))),
    )
    .map_err(|err| anyhow!("failed to run sketch window: {err}"))
}
