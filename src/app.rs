use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IdealFitApp {
    pub state: AppState,
}

impl IdealFitApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for IdealFitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selections ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: mapped points ----
        egui::TopBottomPanel::bottom("mapping_table")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::mapping_table(ui, &self.state);
            });

        // ---- Central panel: the two plots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let half = (ui.available_height() - ui.spacing().item_spacing.y) / 2.0;
            ui.label("Training data and ideal functions");
            plot::selection_plot(ui, &self.state, half - 20.0);
            ui.label("Mapped test data");
            plot::mapping_plot(ui, &self.state, half - 20.0);
        });
    }
}
