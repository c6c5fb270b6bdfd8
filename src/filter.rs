//! Tree filter and status propagator.
//!
//! Produces a new annotated tree from filtered leaves upward: choices are
//! tested first, points survive only with at least one surviving choice,
//! and empty subgroups/groups are dropped entirely rather than hidden. The
//! input tree is never touched.
//!
//! Status flows bottom-up (choice → point → subgroup → group), except that
//! an unoverridden monotony conflict pins the offending elevation or
//! color-scheme point (and its ancestors) to `Required`, which wins every
//! tie-break.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::monotony::MonotonyConflict;
use crate::tree::{
    Choice, DecisionPoint, Group, GroupId, OptionsTree, PickType, PointId, PointKind, SubGroup,
    SubGroupId,
};

/// Which node level a keyword is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterScope {
    /// Test subgroup, point, and choice labels.
    All,
    /// Test subgroup labels only.
    SubGroup,
    /// Test decision-point labels only.
    DecisionPoint,
    /// Test choice labels only.
    Choice,
}

/// A keyword filter with its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFilter {
    /// The keyword, matched case-insensitively as a substring.
    pub keyword: String,
    /// Which labels the keyword is tested against.
    pub scope: FilterScope,
}

/// Which decision points the view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointTypeFilter {
    /// Keep every point.
    #[default]
    Full,
    /// Keep quick-quote points.
    QuickQuote,
    /// Keep non-structural points.
    Design,
    /// Keep structural points.
    Structural,
}

impl PointTypeFilter {
    fn keeps(self, point: &DecisionPoint) -> bool {
        match self {
            Self::Full => true,
            Self::QuickQuote => point.is_quick_quote_item,
            Self::Design => !point.is_structural_item,
            Self::Structural => point.is_structural_item,
        }
    }
}

/// Per-node annotation on the filtered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// A conflict demands attention here; wins every aggregation.
    Required,
    /// Not yet viewed.
    Unviewed,
    /// Viewed but nothing selected.
    Viewed,
    /// Some progress: selections exist but the node is not complete.
    PartiallyCompleted,
    /// Fully settled.
    Completed,
}

/// Inputs to a filter evaluation.
#[derive(Debug, Clone, Copy)]
pub struct FilterInput<'a> {
    /// Optional keyword filter.
    pub keyword: Option<&'a KeywordFilter>,
    /// Point-type selection.
    pub point_type: PointTypeFilter,
    /// Current monotony result, for the `Required` pre-pass.
    pub conflict: &'a MonotonyConflict,
    /// True while a plan-change change order is active; hides every point
    /// except elevation and color scheme.
    pub plan_change_active: bool,
}

/// An annotated surviving choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredChoice {
    /// Deep copy of the choice.
    pub choice: Choice,
    /// Derived status.
    pub status: NodeStatus,
}

/// An annotated surviving decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredPoint {
    /// Point identity.
    pub id: PointId,
    /// Display label.
    pub label: String,
    /// Functional role.
    pub kind: PointKind,
    /// Cardinality rule.
    pub pick_type: PickType,
    /// Structural classification.
    pub is_structural_item: bool,
    /// Quick-quote classification.
    pub is_quick_quote_item: bool,
    /// Derived status.
    pub status: NodeStatus,
    /// Surviving choices.
    pub choices: Vec<FilteredChoice>,
}

/// An annotated surviving subgroup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSubGroup {
    /// Subgroup identity.
    pub id: SubGroupId,
    /// Display label.
    pub label: String,
    /// Derived status.
    pub status: NodeStatus,
    /// Surviving points.
    pub points: Vec<FilteredPoint>,
}

/// An annotated surviving group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredGroup {
    /// Group identity.
    pub id: GroupId,
    /// Display label.
    pub label: String,
    /// Derived status.
    pub status: NodeStatus,
    /// Surviving subgroups.
    pub sub_groups: Vec<FilteredSubGroup>,
}

/// The filtered, annotated tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilteredTree {
    /// Surviving groups.
    pub groups: Vec<FilteredGroup>,
}

struct Keyword {
    regex: Regex,
    scope: FilterScope,
}

impl Keyword {
    fn build(filter: &KeywordFilter) -> Option<Self> {
        let keyword = filter.keyword.trim();
        if keyword.is_empty() {
            return None;
        }
        // Escaped keyword: a plain case-insensitive substring test.
        let regex = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self {
            regex,
            scope: filter.scope,
        })
    }

    fn matches(&self, scope: FilterScope, label: &str) -> bool {
        (self.scope == FilterScope::All || self.scope == scope) && self.regex.is_match(label)
    }
}

/// Filters the tree and derives per-node status bottom-up.
#[must_use]
pub fn filter_tree(tree: &OptionsTree, input: &FilterInput<'_>) -> FilteredTree {
    let keyword = input.keyword.and_then(Keyword::build);

    let groups = tree
        .groups
        .iter()
        .filter_map(|group| filter_group(group, keyword.as_ref(), input))
        .collect();

    FilteredTree { groups }
}

fn filter_group(
    group: &Group,
    keyword: Option<&Keyword>,
    input: &FilterInput<'_>,
) -> Option<FilteredGroup> {
    let sub_groups: Vec<FilteredSubGroup> = group
        .sub_groups
        .iter()
        .filter_map(|sg| filter_sub_group(sg, keyword, input))
        .collect();
    if sub_groups.is_empty() {
        return None;
    }

    let status = aggregate(sub_groups.iter().map(|sg| sg.status));
    Some(FilteredGroup {
        id: group.id,
        label: group.label.clone(),
        status,
        sub_groups,
    })
}

fn filter_sub_group(
    sub_group: &SubGroup,
    keyword: Option<&Keyword>,
    input: &FilterInput<'_>,
) -> Option<FilteredSubGroup> {
    let ancestor_matched =
        keyword.is_some_and(|kw| kw.matches(FilterScope::SubGroup, &sub_group.label));

    let points: Vec<FilteredPoint> = sub_group
        .points
        .iter()
        .filter_map(|point| filter_point(point, keyword, ancestor_matched, input))
        .collect();
    if points.is_empty() {
        return None;
    }

    let status = aggregate(points.iter().map(|p| p.status));
    Some(FilteredSubGroup {
        id: sub_group.id,
        label: sub_group.label.clone(),
        status,
        points,
    })
}

fn filter_point(
    point: &DecisionPoint,
    keyword: Option<&Keyword>,
    ancestor_matched: bool,
    input: &FilterInput<'_>,
) -> Option<FilteredPoint> {
    if !input.point_type.keeps(point) {
        return None;
    }
    // During a plan change, only elevation and color scheme stay actionable.
    if input.plan_change_active && point.kind == PointKind::Standard {
        return None;
    }

    let point_matched =
        ancestor_matched || keyword.is_some_and(|kw| kw.matches(FilterScope::DecisionPoint, &point.label));

    let choices: Vec<FilteredChoice> = point
        .choices
        .iter()
        .filter(|choice| match keyword {
            None => true,
            Some(kw) => point_matched || kw.matches(FilterScope::Choice, &choice.label),
        })
        .map(|choice| FilteredChoice {
            choice: choice.clone(),
            status: choice_status(choice),
        })
        .collect();
    if choices.is_empty() {
        return None;
    }

    let status = point_status(point, &choices, input.conflict);
    Some(FilteredPoint {
        id: point.id,
        label: point.label.clone(),
        kind: point.kind,
        pick_type: point.pick_type,
        is_structural_item: point.is_structural_item,
        is_quick_quote_item: point.is_quick_quote_item,
        status,
        choices,
    })
}

fn choice_status(choice: &Choice) -> NodeStatus {
    if !choice.is_selected() {
        NodeStatus::Unviewed
    } else if choice.attributes_complete() {
        NodeStatus::Completed
    } else {
        NodeStatus::PartiallyCompleted
    }
}

fn point_status(
    point: &DecisionPoint,
    choices: &[FilteredChoice],
    conflict: &MonotonyConflict,
) -> NodeStatus {
    if conflict_requires(point.kind, conflict) {
        return NodeStatus::Required;
    }

    let any_selected = choices.iter().any(|c| c.choice.is_selected());
    let any_complete = choices.iter().any(|c| c.status == NodeStatus::Completed);
    if point.completed && any_complete {
        NodeStatus::Completed
    } else if any_selected {
        NodeStatus::PartiallyCompleted
    } else if point.viewed {
        NodeStatus::Viewed
    } else {
        NodeStatus::Unviewed
    }
}

fn conflict_requires(kind: PointKind, conflict: &MonotonyConflict) -> bool {
    match kind {
        PointKind::ColorScheme => conflict.color_scheme_conflict,
        PointKind::Elevation => {
            conflict.elevation_conflict || conflict.color_scheme_attribute_conflict
        }
        PointKind::Standard => false,
    }
}

fn aggregate(statuses: impl Iterator<Item = NodeStatus>) -> NodeStatus {
    let mut any = false;
    let mut all_completed = true;
    let mut any_progress = false;
    let mut any_viewed = false;
    for status in statuses {
        any = true;
        match status {
            NodeStatus::Required => return NodeStatus::Required,
            NodeStatus::Completed => any_progress = true,
            NodeStatus::PartiallyCompleted => {
                all_completed = false;
                any_progress = true;
            }
            NodeStatus::Viewed => {
                all_completed = false;
                any_viewed = true;
            }
            NodeStatus::Unviewed => all_completed = false,
        }
    }

    if !any {
        NodeStatus::Unviewed
    } else if all_completed {
        NodeStatus::Completed
    } else if any_progress {
        NodeStatus::PartiallyCompleted
    } else if any_viewed {
        NodeStatus::Viewed
    } else {
        NodeStatus::Unviewed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{choice, point, tree_of_points};
    use crate::tree::{ChoiceId, PickType, PointId};

    fn no_conflict() -> MonotonyConflict {
        MonotonyConflict::none()
    }

    fn input_with<'a>(conflict: &'a MonotonyConflict) -> FilterInput<'a> {
        FilterInput {
            keyword: None,
            point_type: PointTypeFilter::Full,
            conflict,
            plan_change_active: false,
        }
    }

    fn selected_point(id: u32, structural: bool) -> DecisionPoint {
        let mut p = point(PointId(id), PickType::Pick1);
        p.is_structural_item = structural;
        p.choices = vec![choice(ChoiceId(id * 10), 1, 100)];
        p
    }

    #[test]
    fn structural_filter_drops_non_structural_points_entirely() {
        let tree = tree_of_points(vec![selected_point(1, true), selected_point(2, false)]);
        let conflict = no_conflict();
        let input = FilterInput {
            point_type: PointTypeFilter::Structural,
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        assert_eq!(filtered.groups.len(), 1);
        let points = &filtered.groups[0].sub_groups[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, PointId(1));
    }

    #[test]
    fn design_filter_keeps_only_non_structural_points() {
        let tree = tree_of_points(vec![selected_point(1, true), selected_point(2, false)]);
        let conflict = no_conflict();
        let input = FilterInput {
            point_type: PointTypeFilter::Design,
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        let points = &filtered.groups[0].sub_groups[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, PointId(2));
    }

    #[test]
    fn quick_quote_filter_drops_empty_groups() {
        let tree = tree_of_points(vec![selected_point(1, false)]);
        let conflict = no_conflict();
        let input = FilterInput {
            point_type: PointTypeFilter::QuickQuote,
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        assert!(filtered.groups.is_empty());
    }

    #[test]
    fn keyword_choice_scope_keeps_only_matching_choices() {
        let mut p = point(PointId(1), PickType::Pick1OrMore);
        let mut granite = choice(ChoiceId(1), 0, 100);
        granite.label = "Granite Countertop".to_string();
        let mut laminate = choice(ChoiceId(2), 0, 40);
        laminate.label = "Laminate Countertop".to_string();
        p.choices = vec![granite, laminate];
        let tree = tree_of_points(vec![p]);

        let conflict = no_conflict();
        let kw = KeywordFilter {
            keyword: "granite".to_string(),
            scope: FilterScope::Choice,
        };
        let input = FilterInput {
            keyword: Some(&kw),
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        let choices = &filtered.groups[0].sub_groups[0].points[0].choices;
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].choice.id, ChoiceId(1));
    }

    #[test]
    fn keyword_point_match_propagates_down_to_choices() {
        let mut p = point(PointId(1), PickType::Pick1OrMore);
        p.label = "Kitchen Counters".to_string();
        p.choices = vec![choice(ChoiceId(1), 0, 100), choice(ChoiceId(2), 0, 40)];
        let tree = tree_of_points(vec![p]);

        let conflict = no_conflict();
        let kw = KeywordFilter {
            keyword: "KITCHEN".to_string(),
            scope: FilterScope::All,
        };
        let input = FilterInput {
            keyword: Some(&kw),
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        // Both choices survive through their matching ancestor.
        assert_eq!(filtered.groups[0].sub_groups[0].points[0].choices.len(), 2);
    }

    #[test]
    fn keyword_match_does_not_propagate_upward() {
        let mut p = point(PointId(1), PickType::Pick1OrMore);
        p.label = "Kitchen Counters".to_string();
        p.choices = vec![choice(ChoiceId(1), 0, 100)];
        let tree = tree_of_points(vec![p]);

        let conflict = no_conflict();
        // Scope SubGroup: the point's matching label is not consulted.
        let kw = KeywordFilter {
            keyword: "kitchen".to_string(),
            scope: FilterScope::SubGroup,
        };
        let input = FilterInput {
            keyword: Some(&kw),
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        assert!(filtered.groups.is_empty());
    }

    #[test]
    fn plan_change_restricts_to_elevation_and_color_scheme() {
        let mut elevation = selected_point(1, true);
        elevation.kind = PointKind::Elevation;
        let standard = selected_point(2, false);
        let tree = tree_of_points(vec![elevation, standard]);

        let conflict = no_conflict();
        let input = FilterInput {
            plan_change_active: true,
            ..input_with(&conflict)
        };
        let filtered = filter_tree(&tree, &input);
        let points = &filtered.groups[0].sub_groups[0].points;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].kind, PointKind::Elevation);
    }

    #[test]
    fn conflicted_elevation_point_is_required_up_the_tree() {
        let mut elevation = selected_point(1, true);
        elevation.kind = PointKind::Elevation;
        elevation.completed = true;
        let tree = tree_of_points(vec![elevation]);

        let conflict = MonotonyConflict {
            monotony_conflict: true,
            elevation_conflict: true,
            ..MonotonyConflict::none()
        };
        let filtered = filter_tree(&tree, &input_with(&conflict));
        let group = &filtered.groups[0];
        assert_eq!(group.status, NodeStatus::Required);
        assert_eq!(group.sub_groups[0].status, NodeStatus::Required);
        assert_eq!(group.sub_groups[0].points[0].status, NodeStatus::Required);
    }

    #[test]
    fn overridden_conflict_does_not_mark_required() {
        // The detector clears the conflict flags on override, so the filter
        // sees a conflict-free result.
        let mut elevation = selected_point(1, true);
        elevation.kind = PointKind::Elevation;
        elevation.completed = true;
        let tree = tree_of_points(vec![elevation]);

        let conflict = MonotonyConflict {
            elevation_conflict_override: true,
            ..MonotonyConflict::none()
        };
        let filtered = filter_tree(&tree, &input_with(&conflict));
        assert_eq!(
            filtered.groups[0].sub_groups[0].points[0].status,
            NodeStatus::Completed
        );
    }

    #[test]
    fn status_propagates_bottom_up() {
        let mut completed = selected_point(1, false);
        completed.completed = true;
        let mut untouched = point(PointId(2), PickType::Pick1);
        untouched.choices = vec![choice(ChoiceId(20), 0, 10)];
        let tree = tree_of_points(vec![completed, untouched]);

        let conflict = no_conflict();
        let filtered = filter_tree(&tree, &input_with(&conflict));
        let sub_group = &filtered.groups[0].sub_groups[0];
        assert_eq!(sub_group.points[0].status, NodeStatus::Completed);
        assert_eq!(sub_group.points[1].status, NodeStatus::Unviewed);
        // Mixed progress rolls up as partially completed.
        assert_eq!(sub_group.status, NodeStatus::PartiallyCompleted);
        assert_eq!(filtered.groups[0].status, NodeStatus::PartiallyCompleted);
    }

    #[test]
    fn input_tree_is_untouched() {
        let tree = tree_of_points(vec![selected_point(1, true), selected_point(2, false)]);
        let before = tree.clone();
        let conflict = no_conflict();
        let input = FilterInput {
            point_type: PointTypeFilter::Structural,
            ..input_with(&conflict)
        };
        let _ = filter_tree(&tree, &input);
        assert_eq!(tree, before);
    }
}
