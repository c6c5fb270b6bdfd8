//! Scenario status classifier.
//!
//! Collapses the whole configuration into one status value, recomputed from
//! current inputs on every evaluation. The monotony conflict result is an
//! overriding signal: a conflicted, incomplete configuration is never
//! reported as ready for anything.

use serde::{Deserialize, Serialize};

use crate::monotony::MonotonyConflict;
use crate::tree::{Choice, DecisionPoint, OptionsTree};

/// Overall readiness of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioStatus {
    /// Structural decision points remain unfulfilled.
    ReadyForStructural,
    /// Structural points are settled; design points remain.
    ReadyForDesign,
    /// Every decision point is fulfilled.
    ReadyToBuild,
    /// A monotony conflict blocks the configuration.
    MonotonyConflict,
}

/// Completeness predicates supplied by the surrounding application state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessFlags {
    /// A lot is selected (agreement, draft scenario, or plan-change pick).
    pub has_lot: bool,
    /// A plan is selected (same sources as `has_lot`).
    pub has_plan: bool,
    /// An elevation choice is selected.
    pub has_elevation: bool,
    /// A color scheme is selected, standalone or as elevation attributes.
    pub has_color_scheme: bool,
    /// An in-progress plan-change change order still needs its new plan.
    pub needs_plan_change: bool,
}

impl CompletenessFlags {
    /// Overall completeness of the configuration.
    #[must_use]
    pub const fn is_complete(&self, conflict: &MonotonyConflict) -> bool {
        self.has_lot
            && self.has_plan
            && self.has_elevation
            && self.has_color_scheme
            && !conflict.monotony_conflict
            && !self.needs_plan_change
    }
}

/// Whether a decision point requires no further buyer action.
///
/// A point is fulfilled when it is disabled, has no enabled choices, has
/// been viewed (Pick-0 points need nothing more), or carries a selected
/// choice with complete attribute data on a point the buyer marked
/// complete.
#[must_use]
pub fn point_is_fulfilled(point: &DecisionPoint) -> bool {
    if !point.enabled || !point.has_enabled_choices() {
        return true;
    }
    if !point.pick_type.requires_selection() {
        return point.viewed;
    }
    point.completed && point.selected_choices().any(Choice::attributes_complete)
}

/// Classifies the configuration; first match wins.
#[must_use]
pub fn classify(
    tree: Option<&OptionsTree>,
    conflict: &MonotonyConflict,
    flags: &CompletenessFlags,
) -> ScenarioStatus {
    if !flags.is_complete(conflict) && conflict.monotony_conflict {
        return ScenarioStatus::MonotonyConflict;
    }

    let mut all_fulfilled = true;
    let mut structural_fulfilled = true;
    if let Some(tree) = tree {
        for point in tree.points() {
            let fulfilled = point_is_fulfilled(point);
            all_fulfilled &= fulfilled;
            if point.is_structural_item {
                structural_fulfilled &= fulfilled;
            }
        }
    }

    if !structural_fulfilled {
        ScenarioStatus::ReadyForStructural
    } else if all_fulfilled {
        ScenarioStatus::ReadyToBuild
    } else {
        ScenarioStatus::ReadyForDesign
    }
}
