use ideal_fit::data::filter::{
    init_visibility, set_all, visible_candidates, visible_pairs, VisibilityState,
};
use ideal_fit::{Dataset, DeviationScope, MatchConfig, Outcome, Process, Selection};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded input tables (None until data is loaded).
    pub dataset: Option<Dataset>,

    /// Inputs of the current run, built from `dataset`.
    pub process: Option<Process>,

    /// Result of the last run.
    pub outcome: Option<Outcome>,

    /// Classification settings used for the next run.
    pub config: MatchConfig,

    /// Per-training visibility in the plots.
    pub visibility: VisibilityState,

    /// Colour per selected ideal function.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    pub fn new(config: MatchConfig) -> Self {
        AppState {
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset and run the match on it.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.loading = false;
        match Process::from_dataset(&dataset) {
            Ok(process) => {
                self.process = Some(process.with_config(self.config));
                self.dataset = Some(dataset);
                self.status_message = None;
                self.rerun();
            }
            Err(e) => {
                log::error!("Unusable dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Adopt a run computed outside the viewer.
    pub fn set_outcome(&mut self, dataset: Dataset, process: Process, outcome: Outcome) {
        self.config = *process.config();
        self.dataset = Some(dataset);
        self.process = Some(process);
        self.install_outcome(outcome);
    }

    /// Re-run selection and classification with the current config.
    pub fn rerun(&mut self) {
        let Some(process) = self.process.take() else {
            return;
        };
        let process = process.with_config(self.config);
        match process.run() {
            Ok(outcome) => {
                self.status_message = None;
                self.install_outcome(outcome);
            }
            Err(e) => {
                log::error!("Matching failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.outcome = None;
            }
        }
        self.process = Some(process);
    }

    fn install_outcome(&mut self, outcome: Outcome) {
        self.visibility = init_visibility(&outcome.selection);
        self.color_map = ColorMap::for_selection(&outcome.selection);
        self.outcome = Some(outcome);
    }

    pub fn is_strict(&self) -> bool {
        self.config.deviation_scope == DeviationScope::PerTraining
    }

    /// Switch deviation scope and re-run.
    pub fn set_strict(&mut self, strict: bool) {
        self.config.deviation_scope = if strict {
            DeviationScope::PerTraining
        } else {
            DeviationScope::PerCandidate
        };
        self.rerun();
    }

    /// Selected pairs currently shown, in selection order.
    pub fn visible_pairs(&self) -> Vec<&Selection> {
        match &self.outcome {
            Some(outcome) => visible_pairs(&outcome.selection, &self.visibility),
            None => Vec::new(),
        }
    }

    pub fn visible_candidates(&self) -> Vec<&str> {
        match &self.outcome {
            Some(outcome) => visible_candidates(&outcome.selection, &self.visibility),
            None => Vec::new(),
        }
    }

    pub fn toggle_visibility(&mut self, training: &str) {
        let shown = self.visibility.entry(training.to_string()).or_insert(true);
        *shown = !*shown;
    }

    pub fn show_all(&mut self) {
        set_all(&mut self.visibility, true);
    }

    pub fn show_none(&mut self) {
        set_all(&mut self.visibility, false);
    }
}
