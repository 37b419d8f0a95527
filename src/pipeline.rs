//! End-to-end run: selection, classification, persistence.

use serde::Serialize;

use crate::data::loader::Dataset;
use crate::data::model::{Catalog, ObservedPoint, Table, TrainingSet, UnmappedPoint};
use crate::matching::{self, Classification, MatchConfig, SelectionResult};
use crate::sink::{PersistenceError, Sink, IDEAL_TABLE, MAPPED_TABLE, TEST_TABLE, TRAIN_TABLE};

/// The inputs of one matching run.
#[derive(Debug, Clone)]
pub struct Process {
    training: TrainingSet,
    catalog: Catalog,
    points: Vec<ObservedPoint>,
    config: MatchConfig,
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub selection: SelectionResult,
    pub classification: Classification,
}

impl Process {
    pub fn new(training: TrainingSet, catalog: Catalog, points: Vec<ObservedPoint>) -> Self {
        Process {
            training,
            catalog,
            points,
            config: MatchConfig::default(),
        }
    }

    pub fn from_dataset(dataset: &Dataset) -> anyhow::Result<Self> {
        Ok(Self::new(
            dataset.training_set()?,
            dataset.catalog()?,
            dataset.points()?,
        ))
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn training(&self) -> &TrainingSet {
        &self.training
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn points(&self) -> &[ObservedPoint] {
        &self.points
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Choose the ideal function for every training series.
    pub fn select(&self) -> matching::Result<SelectionResult> {
        matching::select_best_matches(&self.training, &self.catalog)
    }

    /// Select, then classify the test points against the selection.
    pub fn run(&self) -> matching::Result<Outcome> {
        let selection = self.select()?;
        let classification =
            matching::map_observations_with(&self.points, &selection, &self.catalog, &self.config);
        Ok(Outcome {
            selection,
            classification,
        })
    }
}

impl Outcome {
    /// `x, y, delta_y, ideal_func` for every mapped point.
    pub fn mapped_table(&self) -> Table {
        let mapped = &self.classification.mapped;
        Table::new()
            .with_float("x", mapped.iter().map(|r| r.x).collect())
            .with_float("y", mapped.iter().map(|r| r.y).collect())
            .with_float("delta_y", mapped.iter().map(|r| r.delta_y).collect())
            .with_text("ideal_func", mapped.iter().map(|r| r.ideal_func.clone()).collect())
    }

    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            selections: self
                .selection
                .pairs()
                .iter()
                .map(|s| SelectionSummary {
                    training: &s.training,
                    ideal_func: &s.candidate,
                    sum_squared_error: s.error,
                    max_deviation: s.max_deviation,
                    threshold_deviation: self.selection.max_deviation(&s.candidate),
                })
                .collect(),
            mapped_points: self.classification.mapped.len(),
            unmapped_points: &self.classification.unmapped,
        }
    }
}

/// Serializable digest of a run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub selections: Vec<SelectionSummary<'a>>,
    pub mapped_points: usize,
    pub unmapped_points: &'a [UnmappedPoint],
}

#[derive(Debug, Serialize)]
pub struct SelectionSummary<'a> {
    pub training: &'a str,
    pub ideal_func: &'a str,
    pub sum_squared_error: f64,
    pub max_deviation: f64,
    /// Deviation stored under the ideal function id (differs from
    /// `max_deviation` when another training series selected it later).
    pub threshold_deviation: Option<f64>,
}

/// Hand the input tables and the mapped-points table to `sink`.
pub fn persist(dataset: &Dataset, outcome: &Outcome, sink: &mut dyn Sink) -> Result<(), PersistenceError> {
    sink.write_table(TRAIN_TABLE, &dataset.training.to_table())?;
    sink.write_table(IDEAL_TABLE, &dataset.ideal.to_table())?;
    sink.write_table(TEST_TABLE, &dataset.test.to_table())?;
    sink.write_table(MAPPED_TABLE, &outcome.mapped_table())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;

    fn process() -> Process {
        let x = vec![1.0, 2.0, 3.0];
        let training: TrainingSet = [("y1", Series::new(x.clone(), vec![2.0, 3.0, 4.0]))]
            .into_iter()
            .collect();
        let catalog: Catalog = [
            ("y10", Series::new(x.clone(), vec![2.1, 3.1, 4.1])),
            ("y20", Series::new(x, vec![10.0, 10.0, 10.0])),
        ]
        .into_iter()
        .collect();
        Process::new(
            training,
            catalog,
            vec![ObservedPoint::new(1.0, 2.15), ObservedPoint::new(2.0, 50.0)],
        )
    }

    #[test]
    fn run_selects_then_classifies() {
        let outcome = process().run().unwrap();
        assert_eq!(outcome.selection.candidate_for("y1"), Some("y10"));
        assert_eq!(outcome.classification.mapped.len(), 1);
        assert_eq!(outcome.classification.unmapped.len(), 1);
    }

    #[test]
    fn mapped_table_has_result_columns() {
        let table = process().run().unwrap().mapped_table();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "delta_y", "ideal_func"]);
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column("ideal_func").and_then(|c| c.cell(0)), Some("y10".to_string()));
    }

    #[test]
    fn summary_serializes_to_json() {
        let outcome = process().run().unwrap();
        let json = serde_json::to_value(outcome.summary()).unwrap();
        assert_eq!(json["selections"][0]["ideal_func"], "y10");
        assert_eq!(json["mapped_points"], 1);
        assert_eq!(json["unmapped_points"][0]["y"], 50.0);
    }
}
