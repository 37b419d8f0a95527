use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Plots (central panel)
// ---------------------------------------------------------------------------

fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a data folder to match functions  (File → Open folder…)");
    });
}

/// Training samples as points, selected ideal functions as lines.
pub fn selection_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let (Some(process), Some(_)) = (&state.process, &state.outcome) else {
        empty_hint(ui);
        return;
    };

    Plot::new("selection_plot")
        .legend(Legend::default())
        .height(height)
        .x_axis_label("x")
        .y_axis_label("y")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for pair in state.visible_pairs() {
                let color = state.color_map.color_for(&pair.candidate);

                if let Some(training) = process.training().get(&pair.training) {
                    let points: PlotPoints = training.samples().map(|(x, y)| [x, y]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .name(format!("Train {}", pair.training))
                            .color(color.gamma_multiply(0.6))
                            .radius(2.0),
                    );
                }
            }

            for candidate in state.visible_candidates() {
                if let Some(ideal) = process.catalog().get(candidate) {
                    let line: PlotPoints = ideal.samples().map(|(x, y)| [x, y]).collect();
                    plot_ui.line(
                        Line::new(line)
                            .name(format!("Ideal {candidate}"))
                            .color(state.color_map.color_for(candidate))
                            .width(2.0),
                    );
                }
            }
        });
}

/// Mapped test points coloured by ideal function; unmapped points in gray.
pub fn mapping_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let Some(outcome) = &state.outcome else {
        empty_hint(ui);
        return;
    };

    Plot::new("mapping_plot")
        .legend(Legend::default())
        .height(height)
        .x_axis_label("x")
        .y_axis_label("y")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for candidate in state.visible_candidates() {
                let mapped: PlotPoints = outcome
                    .classification
                    .mapped
                    .iter()
                    .filter(|r| r.ideal_func == candidate)
                    .map(|r| [r.x, r.y])
                    .collect();
                plot_ui.points(
                    Points::new(mapped)
                        .name(format!("Mapped to {candidate}"))
                        .color(state.color_map.color_for(candidate))
                        .radius(3.0),
                );
            }

            let unmapped: PlotPoints = outcome
                .classification
                .unmapped
                .iter()
                .map(|p| [p.x, p.y])
                .collect();
            plot_ui.points(
                Points::new(unmapped)
                    .name("Unmapped")
                    .color(Color32::GRAY)
                    .radius(3.0),
            );
        });
}
