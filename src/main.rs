mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::FundPandaApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    log::info!("Using dataset {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "US Funds Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(FundPandaApp::new(&config)))),
    )
}
