//! Shared fixtures for unit tests.

use crate::tree::{
    Choice, ChoiceId, DecisionPoint, Group, GroupId, OptionsTree, PickType, PointId, PointKind,
    SubGroup, SubGroupId,
};

/// A plain enabled choice with the given quantity and price.
pub fn choice(id: ChoiceId, quantity: u32, price: i64) -> Choice {
    Choice {
        id,
        label: format!("choice-{id}"),
        quantity,
        price,
        enabled: true,
        override_note: None,
        required_attributes: 0,
        selected_attributes: Vec::new(),
    }
}

/// A plain enabled standard point with no choices.
pub fn point(id: PointId, pick_type: PickType) -> DecisionPoint {
    DecisionPoint {
        id,
        label: format!("point-{id}"),
        kind: PointKind::Standard,
        pick_type,
        is_structural_item: false,
        is_quick_quote_item: false,
        is_past_cut_off: false,
        enabled: true,
        viewed: false,
        completed: false,
        choices: Vec::new(),
    }
}

/// Wraps points into a single group/subgroup tree.
pub fn tree_of_points(points: Vec<DecisionPoint>) -> OptionsTree {
    OptionsTree::new(vec![Group {
        id: GroupId(1),
        label: "Group".to_string(),
        sub_groups: vec![SubGroup {
            id: SubGroupId(1),
            label: "SubGroup".to_string(),
            points,
        }],
    }])
}
