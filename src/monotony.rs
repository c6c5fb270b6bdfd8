//! Monotony conflict detector.
//!
//! Communities forbid building a home that duplicates a nearby home's
//! elevation or color scheme. The rules travel with the lot; this module
//! decides whether the current elevation/color-scheme selection violates
//! them. Conflicts are reported as an explicit result record, never as
//! errors, and a human override on a choice suppresses that conflict type
//! while still being surfaced through the `*_override` flags.

use serde::{Deserialize, Serialize};

use crate::lot::{Lot, MonotonyRule, PlanId};
use crate::tree::{Choice, DecisionPoint};

/// Result of a monotony evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonotonyConflict {
    /// True when any unsuppressed elevation or color-scheme conflict exists.
    pub monotony_conflict: bool,
    /// The selected color scheme duplicates a nearby home.
    pub color_scheme_conflict: bool,
    /// A color-scheme conflict exists but was explicitly overridden.
    pub color_scheme_conflict_override: bool,
    /// The selected elevation duplicates a nearby home.
    pub elevation_conflict: bool,
    /// An elevation conflict exists but was explicitly overridden.
    pub elevation_conflict_override: bool,
    /// The color-scheme conflict arose from elevation-choice attributes.
    pub color_scheme_attribute_conflict: bool,
    /// Whether the user has already been shown an advisement for the
    /// current conflict.
    pub conflict_seen: bool,
}

impl MonotonyConflict {
    /// An all-false result, used when no lot is selected.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            monotony_conflict: false,
            color_scheme_conflict: false,
            color_scheme_conflict_override: false,
            elevation_conflict: false,
            elevation_conflict_override: false,
            color_scheme_attribute_conflict: false,
            conflict_seen: false,
        }
    }

    /// True when any conflict or override flag is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.monotony_conflict
            || self.color_scheme_conflict
            || self.color_scheme_conflict_override
            || self.elevation_conflict
            || self.elevation_conflict_override
    }
}

/// Inputs to a monotony evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonyInput<'a> {
    /// Selected lot, with its rules and community flags.
    pub lot: Option<&'a Lot>,
    /// Selected plan.
    pub plan_id: Option<PlanId>,
    /// The elevation decision point, if the tree has one.
    pub elevation_point: Option<&'a DecisionPoint>,
    /// The standalone color-scheme decision point, if the tree has one.
    pub color_scheme_point: Option<&'a DecisionPoint>,
    /// Whether the conflict advisement was already shown to the user.
    pub advisement_shown: bool,
}

/// Evaluates the lot's monotony rules against the current selection.
#[must_use]
pub fn detect_conflicts(input: &MonotonyInput<'_>) -> MonotonyConflict {
    let Some(lot) = input.lot else {
        return MonotonyConflict::none();
    };

    let mut result = MonotonyConflict::none();
    let rules = lot.monotony_rules.as_slice();

    let elevation_choice = input
        .elevation_point
        .and_then(DecisionPoint::selected_choice);
    let color_scheme_choice = input
        .color_scheme_point
        .and_then(DecisionPoint::selected_choice);

    if let Some(elevation) = elevation_choice {
        if elevation_rule_matches(rules, input.plan_id, elevation) {
            if elevation.override_note.is_some() {
                result.elevation_conflict_override = true;
            } else {
                result.elevation_conflict = true;
            }
        }

        // Color scheme carried as attributes of the elevation choice.
        if input.color_scheme_point.is_none() && !elevation.selected_attributes.is_empty() {
            if attribute_rule_matches(rules, input.plan_id, elevation) {
                if elevation.override_note.is_some() {
                    result.color_scheme_conflict_override = true;
                } else {
                    result.color_scheme_attribute_conflict = true;
                    result.color_scheme_conflict = true;
                }
            }
        }
    }

    if let Some(color_scheme) = color_scheme_choice {
        let plan_scoped = lot.financial_community.is_color_scheme_plan_rule_enabled;
        if color_scheme_rule_matches(rules, input.plan_id, plan_scoped, color_scheme) {
            if color_scheme.override_note.is_some() {
                result.color_scheme_conflict_override = true;
            } else {
                result.color_scheme_conflict = true;
            }
        }
    }

    result.monotony_conflict = result.color_scheme_conflict || result.elevation_conflict;
    result.conflict_seen = input.advisement_shown && result.any();
    result
}

fn elevation_rule_matches(
    rules: &[MonotonyRule],
    plan_id: Option<PlanId>,
    elevation: &Choice,
) -> bool {
    let Some(plan_id) = plan_id else {
        return false;
    };
    rules.iter().any(|rule| {
        rule.rule_type.covers_elevation()
            && rule.plan_id == plan_id
            && rule.elevation_choice_id == Some(elevation.id)
    })
}

fn attribute_rule_matches(
    rules: &[MonotonyRule],
    plan_id: Option<PlanId>,
    elevation: &Choice,
) -> bool {
    let Some(plan_id) = plan_id else {
        return false;
    };
    // Conjunctive: every selected attribute must appear in the rule.
    rules.iter().any(|rule| {
        rule.rule_type.covers_color_scheme()
            && rule.plan_id == plan_id
            && elevation
                .selected_attributes
                .iter()
                .all(|attr| rule.color_scheme_attribute_ids.contains(&attr.attribute_id))
    })
}

fn color_scheme_rule_matches(
    rules: &[MonotonyRule],
    plan_id: Option<PlanId>,
    plan_scoped: bool,
    color_scheme: &Choice,
) -> bool {
    rules.iter().any(|rule| {
        if !rule.rule_type.covers_color_scheme() {
            return false;
        }
        if rule.color_scheme_choice_id != Some(color_scheme.id) {
            return false;
        }
        !plan_scoped || plan_id == Some(rule.plan_id)
    })
}
