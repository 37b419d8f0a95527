use ideal_fit::matching::{max_abs_deviation, squared_error};
use ideal_fit::{
    map_observations, select_best_matches, Catalog, ObservedPoint, Series, TrainingSet,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn domain(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn series_set(prefix: &str, n: usize, columns: &[Vec<f64>]) -> (Vec<String>, ideal_fit::SeriesSet) {
    let ids: Vec<String> = (0..columns.len()).map(|i| format!("{prefix}{i}")).collect();
    let set = ids
        .iter()
        .cloned()
        .zip(columns.iter().map(|y| Series::new(domain(n), y[..n].to_vec())))
        .collect();
    (ids, set)
}

/// `(n, training columns, catalog columns, points)`; every column has at least `n` values.
fn scenario() -> impl Strategy<Value = (usize, Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<(usize, f64)>)> {
    (1usize..8).prop_flat_map(|n| {
        let column = prop::collection::vec(-10.0f64..10.0, n);
        (
            Just(n),
            prop::collection::vec(column.clone(), 1..5),
            prop::collection::vec(column, 1..7),
            // x indices up to n + 1 so some points fall outside the domain
            prop::collection::vec((0..n + 2, -12.0f64..12.0), 0..40),
        )
    })
}

fn build(
    n: usize,
    train_cols: &[Vec<f64>],
    ideal_cols: &[Vec<f64>],
) -> (Vec<String>, TrainingSet, Vec<String>, Catalog) {
    let (train_ids, training) = series_set("t", n, train_cols);
    let (ideal_ids, catalog) = series_set("c", n, ideal_cols);
    (train_ids, training, ideal_ids, catalog)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        ..ProptestConfig::default()
    })]

    #[test]
    fn selection_minimises_error_with_first_seen_ties(
        (n, train_cols, ideal_cols, _points) in scenario()
    ) {
        let (train_ids, training, ideal_ids, catalog) = build(n, &train_cols, &ideal_cols);
        let selection = select_best_matches(&training, &catalog).unwrap();

        prop_assert_eq!(selection.len(), train_ids.len());
        for (pair, t_id) in selection.pairs().iter().zip(&train_ids) {
            prop_assert_eq!(&pair.training, t_id);
            let t = training.get(t_id).unwrap();
            let chosen = catalog.get(&pair.candidate).unwrap();
            let chosen_pos = ideal_ids.iter().position(|c| *c == pair.candidate).unwrap();

            for (pos, c_id) in ideal_ids.iter().enumerate() {
                let err = squared_error(t, catalog.get(c_id).unwrap());
                prop_assert!(pair.error <= err);
                if pos < chosen_pos {
                    prop_assert!(err > pair.error);
                }
            }

            let dev = max_abs_deviation(t, chosen);
            prop_assert!(dev >= 0.0);
            prop_assert_eq!(pair.max_deviation, dev);
        }

        // The per-candidate bound is the one recorded by the last selecting pair.
        for pair in selection.pairs() {
            let last = selection
                .pairs()
                .iter()
                .rev()
                .find(|p| p.candidate == pair.candidate)
                .unwrap();
            prop_assert_eq!(selection.max_deviation(&pair.candidate), Some(last.max_deviation));
        }
    }

    #[test]
    fn classification_partitions_points_and_respects_threshold(
        (n, train_cols, ideal_cols, raw_points) in scenario()
    ) {
        let (_, training, _, catalog) = build(n, &train_cols, &ideal_cols);
        let selection = select_best_matches(&training, &catalog).unwrap();
        let points: Vec<ObservedPoint> = raw_points
            .iter()
            .map(|&(xi, y)| ObservedPoint::new(xi as f64, y))
            .collect();

        let out = map_observations(&points, &selection, &catalog);
        prop_assert_eq!(out.mapped.len() + out.unmapped.len(), points.len());

        let (mut m, mut u) = (0, 0);
        for p in &points {
            // Replay the first-match rule for this point.
            let expected = selection.pairs().iter().find_map(|pair| {
                let ideal_y = catalog.get(&pair.candidate)?.value_at(p.x)?;
                let bound = selection.max_deviation(&pair.candidate)? * std::f64::consts::SQRT_2;
                ((p.y - ideal_y).abs() <= bound).then(|| pair.candidate.clone())
            });
            match expected {
                Some(candidate) => {
                    let record = &out.mapped[m];
                    prop_assert_eq!((record.x, record.y), (p.x, p.y));
                    prop_assert_eq!(&record.ideal_func, &candidate);
                    let bound = selection.max_deviation(&candidate).unwrap() * std::f64::consts::SQRT_2;
                    prop_assert!(record.delta_y <= bound);
                    m += 1;
                }
                None => {
                    prop_assert_eq!((out.unmapped[u].x, out.unmapped[u].y), (p.x, p.y));
                    u += 1;
                }
            }
        }
        prop_assert_eq!(m, out.mapped.len());
        prop_assert_eq!(u, out.unmapped.len());

        // Points outside the domain never map.
        prop_assert!(out.mapped.iter().all(|r| r.x < n as f64));
        prop_assert_eq!(map_observations(&points, &selection, &catalog), out);
    }
}
