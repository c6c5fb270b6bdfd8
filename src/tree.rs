//! Options-tree model.
//!
//! The tree is the canonical in-memory snapshot of everything a buyer can
//! configure: groups own subgroups, subgroups own decision points, decision
//! points own choices. The engine never mutates a tree it is handed; every
//! derivation reads the snapshot and returns new values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

pub(crate) use id_newtype;

id_newtype!(
    /// Identifier of an option group.
    GroupId
);
id_newtype!(
    /// Identifier of a subgroup.
    SubGroupId
);
id_newtype!(
    /// Identifier of a decision point.
    PointId
);
id_newtype!(
    /// Identifier of a choice.
    ChoiceId
);
id_newtype!(
    /// Identifier of a choice attribute (e.g. a color-scheme swatch).
    AttributeId
);

/// Cardinality rule governing how many of a point's choices may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickType {
    /// Optional point: zero or one selection; viewing it is enough.
    Pick0,
    /// Exactly one choice may carry a positive quantity.
    Pick1,
    /// One or more choices may carry positive quantities.
    Pick1OrMore,
}

impl PickType {
    /// Returns true if the point must end up with a selection to be complete.
    #[must_use]
    pub const fn requires_selection(self) -> bool {
        matches!(self, Self::Pick1 | Self::Pick1OrMore)
    }
}

impl fmt::Display for PickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pick0 => write!(f, "pick-0"),
            Self::Pick1 => write!(f, "pick-1"),
            Self::Pick1OrMore => write!(f, "pick-1-or-more"),
        }
    }
}

/// Functional role of a decision point.
///
/// The source system discriminates these by raw `dPointTypeId` values; the
/// engine only ever cares about elevation and color scheme, so everything
/// else is `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// The elevation decision point (front facade style).
    Elevation,
    /// The standalone color-scheme decision point.
    ColorScheme,
    /// Any other decision point.
    Standard,
}

/// An attribute the buyer picked on a choice, such as a color-scheme swatch
/// carried by an elevation choice when no standalone color-scheme point exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAttribute {
    /// Attribute identity.
    pub attribute_id: AttributeId,
    /// Display name of the attribute.
    pub attribute_name: String,
}

/// A selectable option under a decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Choice identity.
    pub id: ChoiceId,
    /// Display label.
    pub label: String,
    /// Selected quantity; 0 means not selected.
    pub quantity: u32,
    /// Unit price in whole currency units.
    pub price: i64,
    /// Whether the choice can currently be selected.
    pub enabled: bool,
    /// Present when a human explicitly overrode a conflict on this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_note: Option<String>,
    /// Number of attributes that must be picked for this choice to be complete.
    #[serde(default)]
    pub required_attributes: usize,
    /// Attributes the buyer has picked so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_attributes: Vec<SelectedAttribute>,
}

impl Choice {
    /// Returns true if the choice is selected (positive quantity).
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.quantity > 0
    }

    /// Returns true if every required attribute has been picked.
    #[must_use]
    pub fn attributes_complete(&self) -> bool {
        self.selected_attributes.len() >= self.required_attributes
    }

    /// Extended price of this choice (`price × quantity`).
    #[must_use]
    pub const fn extended_price(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

/// A decision the buyer must (or may) make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    /// Point identity.
    pub id: PointId,
    /// Display label.
    pub label: String,
    /// Functional role (elevation, color scheme, or standard).
    pub kind: PointKind,
    /// Cardinality rule for selections.
    pub pick_type: PickType,
    /// Structural points must be settled before construction starts.
    pub is_structural_item: bool,
    /// Points included in quick-quote estimates.
    pub is_quick_quote_item: bool,
    /// Past-cut-off points are ineligible for change orders.
    pub is_past_cut_off: bool,
    /// Whether the point is currently actionable.
    pub enabled: bool,
    /// Whether the buyer has viewed the point.
    pub viewed: bool,
    /// Whether the buyer has marked the point complete.
    pub completed: bool,
    /// Choices under this point, in display order.
    pub choices: Vec<Choice>,
}

impl DecisionPoint {
    /// Iterates over the selected choices.
    pub fn selected_choices(&self) -> impl Iterator<Item = &Choice> {
        self.choices.iter().filter(|c| c.is_selected())
    }

    /// Returns the first selected choice, if any.
    #[must_use]
    pub fn selected_choice(&self) -> Option<&Choice> {
        self.selected_choices().next()
    }

    /// Returns true if at least one choice is currently enabled.
    #[must_use]
    pub fn has_enabled_choices(&self) -> bool {
        self.choices.iter().any(|c| c.enabled)
    }
}

/// A subgroup of related decision points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGroup {
    /// Subgroup identity.
    pub id: SubGroupId,
    /// Display label.
    pub label: String,
    /// Decision points, in display order.
    pub points: Vec<DecisionPoint>,
}

/// A top-level group of subgroups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group identity.
    pub id: GroupId,
    /// Display label.
    pub label: String,
    /// Subgroups, in display order.
    pub sub_groups: Vec<SubGroup>,
}

/// The full options tree: ordered groups of subgroups of points of choices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsTree {
    /// Top-level groups, in display order.
    pub groups: Vec<Group>,
}

impl OptionsTree {
    /// Builds a tree from groups.
    #[must_use]
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Flattens the tree to its decision points in display order.
    pub fn points(&self) -> impl Iterator<Item = &DecisionPoint> {
        self.groups
            .iter()
            .flat_map(|g| g.sub_groups.iter())
            .flat_map(|sg| sg.points.iter())
    }

    /// Finds the first point of the given kind, if present.
    #[must_use]
    pub fn point_of_kind(&self, kind: PointKind) -> Option<&DecisionPoint> {
        self.points().find(|p| p.kind == kind)
    }

    /// Iterates over every selected choice in the tree.
    pub fn selected_choices(&self) -> impl Iterator<Item = &Choice> {
        self.points().flat_map(DecisionPoint::selected_choices)
    }

    /// Sum of `price × quantity` over every selected choice.
    #[must_use]
    pub fn selections_total(&self) -> i64 {
        self.selected_choices().map(Choice::extended_price).sum()
    }

    /// Validates structural invariants.
    ///
    /// A `Pick1` point may have at most one choice with a positive quantity;
    /// labels must be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for group in &self.groups {
            if group.label.trim().is_empty() {
                return Err(ValidationError::EmptyLabel { node: "group" });
            }
            for sub_group in &group.sub_groups {
                if sub_group.label.trim().is_empty() {
                    return Err(ValidationError::EmptyLabel { node: "sub_group" });
                }
                for point in &sub_group.points {
                    if point.label.trim().is_empty() {
                        return Err(ValidationError::EmptyLabel { node: "point" });
                    }
                    let selected = point.selected_choices().count();
                    if point.pick_type == PickType::Pick1 && selected > 1 {
                        return Err(ValidationError::PickCardinality {
                            point_id: point.id,
                            pick_type: point.pick_type,
                            selected,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
