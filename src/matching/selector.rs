use crate::data::model::{Catalog, Series, TrainingSet};

use super::error::{MatchError, Result};
use super::{Selection, SelectionResult};

/// Pick, for every training series, the catalog candidate with the smallest
/// sum of squared residuals.
///
/// Training series are visited in set order and candidates in catalog order.
/// Only a strictly lower error replaces the current best, so among equal
/// errors the first candidate wins. The maximum absolute deviation of each
/// winning pair is stored under the candidate id; see
/// [`SelectionResult::push`] for the overwrite rule.
///
/// # Errors
///
/// * [`MatchError::EmptyCatalog`] when there are training series but no candidates.
/// * [`MatchError::DomainMismatch`] when a candidate is not co-sampled with a training series.
/// * [`MatchError::NoAdmissibleCandidate`] when no candidate has a finite error.
pub fn select_best_matches(training: &TrainingSet, catalog: &Catalog) -> Result<SelectionResult> {
    let entries = training.entries();

    #[cfg(feature = "parallel")]
    let selections: Vec<Selection> = {
        use rayon::prelude::*;
        // Collect every outcome first so the reported error is the earliest
        // failing training series, as in the sequential scan.
        let outcomes: Vec<Result<Selection>> = entries
            .par_iter()
            .map(|(id, series)| best_candidate(id, series, catalog))
            .collect();
        outcomes.into_iter().collect::<Result<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let selections: Vec<Selection> = entries
        .iter()
        .map(|(id, series)| best_candidate(id, series, catalog))
        .collect::<Result<Vec<_>>>()?;

    let mut result = SelectionResult::default();
    for selection in selections {
        log::info!(
            "{} -> {} (sse {:.6}, max deviation {:.6})",
            selection.training,
            selection.candidate,
            selection.error,
            selection.max_deviation
        );
        result.push(selection);
    }

    Ok(result)
}

fn best_candidate(training_id: &str, training: &Series, catalog: &Catalog) -> Result<Selection> {
    if catalog.is_empty() {
        return Err(MatchError::EmptyCatalog {
            training: training_id.to_string(),
        });
    }

    let mut min_error = f64::INFINITY;
    let mut best: Option<(&str, &Series)> = None;

    for (candidate_id, candidate) in catalog.iter() {
        if !training.same_domain(candidate) {
            return Err(MatchError::DomainMismatch {
                training: training_id.to_string(),
                candidate: candidate_id.to_string(),
                training_len: training.len(),
                candidate_len: candidate.len(),
            });
        }
        let error = squared_error(training, candidate);
        log::trace!("{training_id} vs {candidate_id}: sse {error}");
        if error < min_error {
            min_error = error;
            best = Some((candidate_id, candidate));
        }
    }

    let (candidate_id, candidate) = best.ok_or_else(|| MatchError::NoAdmissibleCandidate {
        training: training_id.to_string(),
    })?;

    Ok(Selection {
        training: training_id.to_string(),
        candidate: candidate_id.to_string(),
        error: min_error,
        max_deviation: max_abs_deviation(training, candidate),
    })
}

/// `Σ (a_i - b_i)²` over co-sampled series.
pub fn squared_error(a: &Series, b: &Series) -> f64 {
    a.y()
        .iter()
        .zip(b.y())
        .map(|(ya, yb)| (ya - yb).powi(2))
        .sum()
}

/// `max |a_i - b_i|` over co-sampled series; `0.0` for an empty domain.
pub fn max_abs_deviation(a: &Series, b: &Series) -> f64 {
    a.y()
        .iter()
        .zip(b.y())
        .map(|(ya, yb)| (ya - yb).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(y: &[f64]) -> Series {
        Series::new((1..=y.len()).map(|i| i as f64).collect(), y.to_vec())
    }

    #[test]
    fn squared_error_sums_residuals() {
        let a = series(&[1.0, 2.0, 3.0]);
        let b = series(&[2.0, 2.0, 1.0]);
        assert_eq!(squared_error(&a, &b), 1.0 + 0.0 + 4.0);
        assert_eq!(max_abs_deviation(&a, &b), 2.0);
    }

    #[test]
    fn empty_domain_has_zero_deviation() {
        let a = Series::new(Vec::new(), Vec::new());
        assert_eq!(squared_error(&a, &a), 0.0);
        assert_eq!(max_abs_deviation(&a, &a), 0.0);
    }

    #[test]
    fn equal_errors_keep_first_candidate() {
        let training: TrainingSet = [("y1", series(&[0.0, 0.0]))].into_iter().collect();
        let catalog: Catalog = [
            ("above", series(&[1.0, 1.0])),
            ("below", series(&[-1.0, -1.0])),
        ]
        .into_iter()
        .collect();

        let result = select_best_matches(&training, &catalog).unwrap();
        assert_eq!(result.candidate_for("y1"), Some("above"));
    }

    #[test]
    fn non_finite_candidates_are_never_chosen() {
        let training: TrainingSet = [("y1", series(&[0.0]))].into_iter().collect();
        let catalog: Catalog = [("nan", series(&[f64::NAN])), ("ok", series(&[5.0]))]
            .into_iter()
            .collect();
        let result = select_best_matches(&training, &catalog).unwrap();
        assert_eq!(result.candidate_for("y1"), Some("ok"));

        let only_nan: Catalog = [("nan", series(&[f64::NAN]))].into_iter().collect();
        assert_eq!(
            select_best_matches(&training, &only_nan),
            Err(MatchError::NoAdmissibleCandidate {
                training: "y1".to_string()
            })
        );
    }

    #[test]
    fn empty_training_set_selects_nothing() {
        let catalog: Catalog = [("y1", series(&[1.0]))].into_iter().collect();
        let result = select_best_matches(&TrainingSet::new(), &catalog).unwrap();
        assert!(result.is_empty());
    }
}
