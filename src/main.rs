mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::MastPlannerApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = DashboardConfig::discover().context("loading configuration")?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = PathBuf::from(path);
    }
    log::info!("Data file: {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mast Planner – Cell Site Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(MastPlannerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
