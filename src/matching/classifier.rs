use serde::Serialize;

use crate::data::model::{Catalog, MappingRecord, ObservedPoint, UnmappedPoint};

use super::{DeviationScope, MatchConfig, SelectionResult};

/// Output of one classification run. Both lists keep input order and together
/// hold every input point exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub mapped: Vec<MappingRecord>,
    pub unmapped: Vec<UnmappedPoint>,
}

impl Classification {
    /// Total number of classified points.
    pub fn len(&self) -> usize {
        self.mapped.len() + self.unmapped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.is_empty() && self.unmapped.is_empty()
    }
}

enum Verdict {
    Mapped(MappingRecord),
    Unmapped(UnmappedPoint),
}

/// Classify `points` with the reference settings (per-candidate deviation, `√2` factor).
pub fn map_observations(
    points: &[ObservedPoint],
    selection: &SelectionResult,
    catalog: &Catalog,
) -> Classification {
    map_observations_with(points, selection, catalog, &MatchConfig::default())
}

/// Assign each point to the first selected pair whose threshold it satisfies.
///
/// Pairs are tried in selection order and the first one with
/// `|y - ideal(x)| <= deviation * threshold_factor` wins, even when a later
/// pair would be closer. A pair whose ideal function has no sample at the
/// point's `x` is skipped. Points that pass no pair are reported unmapped.
pub fn map_observations_with(
    points: &[ObservedPoint],
    selection: &SelectionResult,
    catalog: &Catalog,
    config: &MatchConfig,
) -> Classification {
    for candidate in overwritten_bounds(selection, config.deviation_scope) {
        log::warn!(
            "ideal function '{candidate}' was selected by several training series; \
             every pair using it is bounded by the deviation recorded last"
        );
    }

    #[cfg(feature = "parallel")]
    let verdicts: Vec<Verdict> = {
        use rayon::prelude::*;
        points
            .par_iter()
            .map(|p| classify_point(*p, selection, catalog, config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let verdicts: Vec<Verdict> = points
        .iter()
        .map(|p| classify_point(*p, selection, catalog, config))
        .collect();

    let mut out = Classification::default();
    for verdict in verdicts {
        match verdict {
            Verdict::Mapped(record) => out.mapped.push(record),
            Verdict::Unmapped(point) => out.unmapped.push(point),
        }
    }

    log::info!(
        "mapped {} of {} test points ({} unmapped)",
        out.mapped.len(),
        points.len(),
        out.unmapped.len()
    );
    out
}

/// Candidates whose recorded deviation replaced an earlier pair's under `scope`.
fn overwritten_bounds(selection: &SelectionResult, scope: DeviationScope) -> Vec<&str> {
    match scope {
        DeviationScope::PerCandidate => selection.shared_candidates(),
        DeviationScope::PerTraining => Vec::new(),
    }
}

fn classify_point(
    point: ObservedPoint,
    selection: &SelectionResult,
    catalog: &Catalog,
    config: &MatchConfig,
) -> Verdict {
    for pair in selection.pairs() {
        let Some(ideal_y) = catalog
            .get(&pair.candidate)
            .and_then(|ideal| ideal.value_at(point.x))
        else {
            continue;
        };

        let delta_y = (point.y - ideal_y).abs();
        let threshold = selection.deviation_for(pair, config.deviation_scope) * config.threshold_factor;

        if delta_y <= threshold {
            log::debug!(
                "({}, {}) -> {} via {} (delta {delta_y:.6} <= {threshold:.6})",
                point.x,
                point.y,
                pair.candidate,
                pair.training
            );
            return Verdict::Mapped(MappingRecord {
                x: point.x,
                y: point.y,
                delta_y,
                ideal_func: pair.candidate.clone(),
            });
        }
    }

    log::debug!("({}, {}) unmapped", point.x, point.y);
    Verdict::Unmapped(point.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;
    use crate::matching::Selection;

    fn catalog() -> Catalog {
        let x = vec![0.0, 1.0];
        [
            ("wide", Series::new(x.clone(), vec![0.0, 0.0])),
            ("tight", Series::new(x, vec![0.5, 0.5])),
        ]
        .into_iter()
        .collect()
    }

    fn selection() -> SelectionResult {
        let mut result = SelectionResult::default();
        for (training, candidate, dev) in [("y1", "wide", 2.0), ("y2", "tight", 0.1)] {
            result.push(Selection {
                training: training.into(),
                candidate: candidate.into(),
                error: 0.0,
                max_deviation: dev,
            });
        }
        result
    }

    #[test]
    fn first_passing_pair_wins_over_closer_pair() {
        let out = map_observations(&[ObservedPoint::new(0.0, 0.5)], &selection(), &catalog());
        assert_eq!(out.mapped.len(), 1);
        assert_eq!(out.mapped[0].ideal_func, "wide");
        assert_eq!(out.mapped[0].delta_y, 0.5);
    }

    #[test]
    fn missing_x_skips_pair_without_aborting() {
        let out = map_observations(&[ObservedPoint::new(0.5, 0.0)], &selection(), &catalog());
        assert!(out.mapped.is_empty());
        assert_eq!(out.unmapped, vec![UnmappedPoint { x: 0.5, y: 0.0 }]);
    }

    #[test]
    fn nan_observation_is_unmapped() {
        let out = map_observations(&[ObservedPoint::new(0.0, f64::NAN)], &selection(), &catalog());
        assert_eq!(out.unmapped.len(), 1);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn overwritten_bounds_depend_on_scope() {
        let mut shared = selection();
        shared.push(Selection {
            training: "y3".into(),
            candidate: "wide".into(),
            error: 0.0,
            max_deviation: 0.4,
        });

        assert_eq!(overwritten_bounds(&shared, DeviationScope::PerCandidate), vec!["wide"]);
        assert!(overwritten_bounds(&shared, DeviationScope::PerTraining).is_empty());
        assert!(overwritten_bounds(&selection(), DeviationScope::PerCandidate).is_empty());
    }

    #[test]
    fn threshold_factor_scales_bound() {
        let config = MatchConfig {
            threshold_factor: 1.0,
            ..MatchConfig::default()
        };
        // delta 2.5 > 2.0 * 1.0 but <= 2.0 * √2
        let point = [ObservedPoint::new(1.0, 2.5)];
        let strict = map_observations_with(&point, &selection(), &catalog(), &config);
        assert!(strict.mapped.is_empty());
        let loose = map_observations(&point, &selection(), &catalog());
        assert_eq!(loose.mapped[0].ideal_func, "wide");
    }
}
