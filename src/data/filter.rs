use std::collections::BTreeMap;

use crate::matching::{Selection, SelectionResult};

// ---------------------------------------------------------------------------
// Visibility of selected pairs in the viewer
// ---------------------------------------------------------------------------

/// Per-training visibility: training id → shown.
/// A training id absent from the map is shown.
pub type VisibilityState = BTreeMap<String, bool>;

/// Initialise a [`VisibilityState`] with every selected pair shown.
pub fn init_visibility(selection: &SelectionResult) -> VisibilityState {
    selection
        .pairs()
        .iter()
        .map(|s| (s.training.clone(), true))
        .collect()
}

/// Selected pairs that pass the visibility filter, in selection order.
pub fn visible_pairs<'a>(
    selection: &'a SelectionResult,
    visibility: &VisibilityState,
) -> Vec<&'a Selection> {
    selection
        .pairs()
        .iter()
        .filter(|s| visibility.get(&s.training).copied().unwrap_or(true))
        .collect()
}

/// Distinct ideal functions of the shown pairs, in first-selected order.
pub fn visible_candidates<'a>(
    selection: &'a SelectionResult,
    visibility: &VisibilityState,
) -> Vec<&'a str> {
    let mut candidates: Vec<&str> = Vec::new();
    for pair in visible_pairs(selection, visibility) {
        if !candidates.contains(&pair.candidate.as_str()) {
            candidates.push(&pair.candidate);
        }
    }
    candidates
}

/// Set every known training id to `shown`.
pub fn set_all(visibility: &mut VisibilityState, shown: bool) {
    for value in visibility.values_mut() {
        *value = shown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> SelectionResult {
        let mut result = SelectionResult::default();
        for (t, c) in [("y1", "y12"), ("y2", "y40"), ("y3", "y7")] {
            result.push(Selection {
                training: t.into(),
                candidate: c.into(),
                error: 0.0,
                max_deviation: 0.0,
            });
        }
        result
    }

    #[test]
    fn hidden_pairs_are_filtered_in_order() {
        let sel = selection();
        let mut vis = init_visibility(&sel);
        vis.insert("y2".into(), false);

        let shown: Vec<&str> = visible_pairs(&sel, &vis)
            .iter()
            .map(|s| s.candidate.as_str())
            .collect();
        assert_eq!(shown, vec!["y12", "y7"]);
    }

    #[test]
    fn unknown_ids_default_to_shown() {
        let sel = selection();
        assert_eq!(visible_pairs(&sel, &VisibilityState::new()).len(), 3);
    }

    #[test]
    fn shared_candidate_is_listed_once() {
        let mut sel = selection();
        sel.push(Selection {
            training: "y4".into(),
            candidate: "y12".into(),
            error: 0.0,
            max_deviation: 0.0,
        });
        let mut vis = init_visibility(&sel);
        assert_eq!(visible_candidates(&sel, &vis), vec!["y12", "y40", "y7"]);

        // Still shown through y4 when y1 is hidden.
        vis.insert("y1".into(), false);
        assert_eq!(visible_candidates(&sel, &vis), vec!["y40", "y7", "y12"]);
    }

    #[test]
    fn set_all_toggles_every_entry() {
        let sel = selection();
        let mut vis = init_visibility(&sel);
        set_all(&mut vis, false);
        assert!(visible_pairs(&sel, &vis).is_empty());
        set_all(&mut vis, true);
        assert_eq!(visible_pairs(&sel, &vis).len(), 3);
    }
}
