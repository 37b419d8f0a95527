//! Ideal function matching.
//!
//! ```text
//!  TrainingSet ──┐
//!                ├─► selector   ── least squares per training series ──► SelectionResult
//!  Catalog ──────┘                                                          │
//!                                                                           ▼
//!  ObservedPoint* ─────────────► classifier ── first pair within threshold ─► Classification
//! ```
//!
//! The selector runs to completion before the classifier starts; the
//! [`SelectionResult`] is the only value crossing the boundary and is never
//! mutated after selection.

pub mod classifier;
pub mod error;
pub mod selector;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use classifier::{map_observations, map_observations_with, Classification};
pub use error::{MatchError, Result};
pub use selector::{max_abs_deviation, select_best_matches, squared_error};

/// Which recorded deviation bounds a selected pair during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationScope {
    /// Deviation keyed by candidate id. When one candidate is selected by
    /// several training series, the last of them sets the bound for all.
    #[default]
    PerCandidate,
    /// Each pair uses the deviation recorded for its own training series.
    PerTraining,
}

/// Classification settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub deviation_scope: DeviationScope,
    /// Multiplier applied to the recorded maximum deviation.
    pub threshold_factor: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            deviation_scope: DeviationScope::PerCandidate,
            threshold_factor: std::f64::consts::SQRT_2,
        }
    }
}

impl MatchConfig {
    /// Keep deviations per training series instead of per candidate.
    pub fn strict() -> Self {
        MatchConfig {
            deviation_scope: DeviationScope::PerTraining,
            ..Self::default()
        }
    }
}

/// One training series and the ideal function chosen for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub training: String,
    pub candidate: String,
    /// Sum of squared residuals of the winning candidate.
    pub error: f64,
    /// `max |training_y - candidate_y|` over the shared domain for this pair.
    pub max_deviation: f64,
}

/// Outcome of the selector: training id → candidate id, plus the maximum
/// deviation per candidate id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pairs: Vec<Selection>,
    candidate_deviation: BTreeMap<String, f64>,
}

impl SelectionResult {
    /// Record a selection. A candidate already present has its deviation
    /// overwritten by this pair's.
    pub(crate) fn push(&mut self, selection: Selection) {
        self.candidate_deviation
            .insert(selection.candidate.clone(), selection.max_deviation);
        self.pairs.push(selection);
    }

    /// Selected pairs in training order.
    pub fn pairs(&self) -> &[Selection] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn candidate_for(&self, training: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|s| s.training == training)
            .map(|s| s.candidate.as_str())
    }

    /// Maximum deviation stored under a candidate id.
    pub fn max_deviation(&self, candidate: &str) -> Option<f64> {
        self.candidate_deviation.get(candidate).copied()
    }

    /// The deviation that bounds `pair` under the given scope.
    pub fn deviation_for(&self, pair: &Selection, scope: DeviationScope) -> f64 {
        match scope {
            DeviationScope::PerTraining => pair.max_deviation,
            DeviationScope::PerCandidate => self
                .max_deviation(&pair.candidate)
                .unwrap_or(pair.max_deviation),
        }
    }

    /// Candidates chosen by more than one training series, in first-selection order.
    pub fn shared_candidates(&self) -> Vec<&str> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for s in &self.pairs {
            *counts.entry(s.candidate.as_str()).or_default() += 1;
        }
        let mut shared = Vec::new();
        for s in &self.pairs {
            let c = s.candidate.as_str();
            if counts.get(c).copied().unwrap_or(0) > 1 && !shared.contains(&c) {
                shared.push(c);
            }
        }
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(training: &str, candidate: &str, dev: f64) -> Selection {
        Selection {
            training: training.into(),
            candidate: candidate.into(),
            error: 0.0,
            max_deviation: dev,
        }
    }

    #[test]
    fn later_selection_overwrites_candidate_deviation() {
        let mut result = SelectionResult::default();
        result.push(pair("y1", "y7", 0.5));
        result.push(pair("y2", "y7", 0.2));

        assert_eq!(result.max_deviation("y7"), Some(0.2));
        let first = &result.pairs()[0];
        assert_eq!(result.deviation_for(first, DeviationScope::PerCandidate), 0.2);
        assert_eq!(result.deviation_for(first, DeviationScope::PerTraining), 0.5);
        assert_eq!(result.shared_candidates(), vec!["y7"]);
    }

    #[test]
    fn candidate_lookup_by_training_id() {
        let mut result = SelectionResult::default();
        result.push(pair("y1", "y10", 0.1));
        assert_eq!(result.candidate_for("y1"), Some("y10"));
        assert_eq!(result.candidate_for("y2"), None);
        assert!(result.shared_candidates().is_empty());
    }

    #[test]
    fn default_config_uses_sqrt_two() {
        let config = MatchConfig::default();
        assert_eq!(config.deviation_scope, DeviationScope::PerCandidate);
        assert_eq!(config.threshold_factor, 2f64.sqrt());
        assert_eq!(MatchConfig::strict().deviation_scope, DeviationScope::PerTraining);
    }
}
