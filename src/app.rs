use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FundPandaApp {
    pub state: AppState,
}

impl FundPandaApp {
    /// Build the app and read the configured dataset.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.refresh();
        Self { state }
    }
}

impl eframe::App for FundPandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_panel(ui, &mut self.state);
        });
    }
}
