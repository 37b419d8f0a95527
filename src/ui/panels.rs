use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use ideal_fit::data::loader::{DataSource, FileSource};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selections and visibility
// ---------------------------------------------------------------------------

/// Render the left panel: one entry per selected pair.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selected functions");
    ui.separator();

    let Some(outcome) = &state.outcome else {
        ui.label("No data loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let pairs = outcome.selection.pairs().to_vec();
    let deviations: Vec<Option<f64>> = pairs
        .iter()
        .map(|p| outcome.selection.max_deviation(&p.candidate))
        .collect();
    let shared: Vec<String> = outcome
        .selection
        .shared_candidates()
        .into_iter()
        .map(str::to_string)
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.show_none();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (pair, candidate_dev) in pairs.iter().zip(deviations) {
                let color = state.color_map.color_for(&pair.candidate);
                let mut shown = state.visibility.get(&pair.training).copied().unwrap_or(true);
                let label = RichText::new(format!("{} → {}", pair.training, pair.candidate))
                    .color(color)
                    .strong();
                if ui.checkbox(&mut shown, label).changed() {
                    state.toggle_visibility(&pair.training);
                }

                ui.indent(&pair.training, |ui: &mut Ui| {
                    ui.label(format!("SSE {:.4}", pair.error));
                    ui.label(format!("max deviation {:.4}", pair.max_deviation));
                    if let Some(dev) = candidate_dev {
                        if dev != pair.max_deviation {
                            ui.label(
                                RichText::new(format!("bound from {}: {:.4}", pair.candidate, dev))
                                    .color(Color32::YELLOW),
                            );
                        }
                    }
                });
            }

            if !shared.is_empty() {
                ui.separator();
                ui.label(
                    RichText::new(format!("Shared ideal functions: {}", shared.join(", ")))
                        .color(Color32::YELLOW),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bottom panel – mapped points table
// ---------------------------------------------------------------------------

pub fn mapping_table(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.outcome else {
        return;
    };
    let rows = &outcome.classification.mapped;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["x", "y", "Δy", "ideal function"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let record = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", record.x));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", record.y));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", record.delta_y));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(
                        RichText::new(&record.ideal_func)
                            .color(state.color_map.color_for(&record.ideal_func)),
                    );
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.loading {
            ui.spinner();
        }

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} training series, {} ideal functions, {} test points",
                ds.training.columns.len(),
                ds.ideal.columns.len(),
                ds.test.len()
            ));
        }

        if let Some(outcome) = &state.outcome {
            ui.label(format!(
                "{} mapped, {} unmapped",
                outcome.classification.mapped.len(),
                outcome.classification.unmapped.len()
            ));
        }

        ui.separator();

        let strict = state.is_strict();
        if ui
            .selectable_label(strict, "Per-training deviation")
            .on_hover_text("Bound each pair by its own training deviation")
            .clicked()
        {
            state.set_strict(!strict);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

/// Pick a folder holding `train.csv`, `ideal.csv` and `test.csv`, then run.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with train.csv, ideal.csv and test.csv")
        .pick_folder();

    if let Some(dir) = folder {
        state.loading = true;
        let source = FileSource::from_dir(&dir);
        match source.load() {
            Ok(dataset) => {
                log::info!("Loaded {}", source.describe());
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
