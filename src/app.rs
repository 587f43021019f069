use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MastPlannerApp {
    pub state: AppState,
}

impl MastPlannerApp {
    /// Build the app and load the configured data file.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let path = state.data_path.clone();
        state.load_from(&path);
        Self { state }
    }
}

impl eframe::App for MastPlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Blocking error: render nothing else ----
        if let Some(failure) = self.state.load_error.clone() {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_error(ui, &failure);
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::metrics(ui, &self.state);
            ui.separator();
            panels::tab_bar(ui, &mut self.state);
            ui.separator();
            match self.state.tab {
                Tab::Map => plot::site_map(ui, &self.state),
                Tab::Charts => plot::charts(ui, &mut self.state),
                Tab::Table => table::preview(ui, &self.state),
            }
        });
    }
}
