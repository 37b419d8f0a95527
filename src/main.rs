mod app;
mod color;
mod state;
mod ui;

use std::fs::File;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use app::IdealFitApp;
use ideal_fit::config::{CliArgs, RunConfig};
use ideal_fit::sink::sink_for;
use ideal_fit::{pipeline, DataSource, FileSource, Process};
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = args.resolve()?;
    log::debug!("Run configuration: {config:?}");

    let source = FileSource::new(&config.train, &config.ideal, &config.test);
    let dataset = source.load()?;
    let process = Process::from_dataset(&dataset)?.with_config(config.matching);
    let outcome = process.run()?;

    let unmapped = &outcome.classification.unmapped;
    if !unmapped.is_empty() {
        log::warn!("Unmapped points ({}): {:?}", unmapped.len(), unmapped);
    }

    if let Some(mut sink) = sink_for(config.output_format, &config.output_dir) {
        pipeline::persist(&dataset, &outcome, sink.as_mut())?;
        write_summary(&config, &outcome)?;
    }

    if config.show_viewer {
        let mut state = AppState::new(config.matching);
        state.set_outcome(dataset, process, outcome);
        run_viewer(state)?;
    }

    Ok(())
}

fn write_summary(config: &RunConfig, outcome: &ideal_fit::Outcome) -> Result<()> {
    let path = config.output_dir.join("summary.json");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &outcome.summary())
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote run summary to {}", path.display());
    Ok(())
}

fn run_viewer(state: AppState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ideal Fit – Function Matching",
        options,
        Box::new(|_cc| Ok(Box::new(IdealFitApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
