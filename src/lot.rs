//! Lot, plan, and monotony-rule snapshots.
//!
//! Monotony rules travel with the lot record and are read-only to the
//! engine: each rule records an elevation and/or color-scheme configuration
//! already present on a nearby lot for a given plan. Matching rules are what
//! the conflict detector evaluates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{id_newtype, AttributeId, ChoiceId};

id_newtype!(
    /// Identifier of a lot (homesite).
    LotId
);
id_newtype!(
    /// Identifier of a plan.
    PlanId
);

/// Which duplicated aspect a monotony rule records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonotonyRuleType {
    /// A nearby lot already uses the elevation.
    Elevation,
    /// A nearby lot already uses the color scheme.
    ColorScheme,
    /// A nearby lot duplicates both.
    Both,
}

impl MonotonyRuleType {
    /// Returns true if the rule constrains elevation choices.
    #[must_use]
    pub const fn covers_elevation(self) -> bool {
        matches!(self, Self::Elevation | Self::Both)
    }

    /// Returns true if the rule constrains color-scheme choices.
    #[must_use]
    pub const fn covers_color_scheme(self) -> bool {
        matches!(self, Self::ColorScheme | Self::Both)
    }
}

/// A "no identical house next door" rule scoped to a lot and plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonotonyRule {
    /// Which aspect the rule constrains.
    pub rule_type: MonotonyRuleType,
    /// Plan the nearby configuration was built on.
    pub plan_id: PlanId,
    /// Elevation choice already in use nearby, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_choice_id: Option<ChoiceId>,
    /// Standalone color-scheme choice already in use nearby, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme_choice_id: Option<ChoiceId>,
    /// Color-scheme attribute ids in use nearby, when color scheme is
    /// expressed as attributes of an elevation choice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color_scheme_attribute_ids: Vec<AttributeId>,
}

/// Community-level feature flags that alter rule and price evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinancialCommunity {
    /// When true, color-scheme rule matches additionally require the rule's
    /// plan to equal the selected plan.
    pub is_color_scheme_plan_rule_enabled: bool,
    /// When true, per-phase plan prices may replace the plan's flat price.
    pub is_phased_pricing_enabled: bool,
}

/// Per-plan price inside a sales phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlanPrice {
    /// Plan the phase price applies to.
    pub plan_id: PlanId,
    /// Phase price in whole currency units.
    pub price: i64,
}

/// The sales phase a lot currently sits in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPhase {
    /// Phase name.
    pub name: String,
    /// Per-plan prices for this phase.
    #[serde(default)]
    pub plan_prices: Vec<PhasePlanPrice>,
}

impl SalesPhase {
    /// Looks up the phase price for a plan, if one is defined.
    #[must_use]
    pub fn price_for_plan(&self, plan_id: PlanId) -> Option<i64> {
        self.plan_prices
            .iter()
            .find(|pp| pp.plan_id == plan_id)
            .map(|pp| pp.price)
    }
}

/// A selected homesite with its rules and community flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Lot identity.
    pub id: LotId,
    /// Lot premium in whole currency units.
    pub premium: i64,
    /// Monotony rules fetched with the lot record.
    #[serde(default)]
    pub monotony_rules: Vec<MonotonyRule>,
    /// Community feature flags.
    #[serde(default)]
    pub financial_community: FinancialCommunity,
    /// Active sales phase, if the community sells in phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_phase: Option<SalesPhase>,
}

/// A selected plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identity.
    pub id: PlanId,
    /// Flat base price in whole currency units.
    pub price: i64,
}
