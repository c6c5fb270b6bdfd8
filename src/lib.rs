//! # scenario-engine - Derivation engine for homebuilder sales configuration
//!
//! A pure, synchronous computation core for a sales-configuration system.
//! It takes already-fetched domain snapshots (options tree, lot, plan,
//! sales agreement, change order, job) and derives the facts the rest of
//! the application renders:
//!
//! - **Monotony conflicts**: does the selected elevation/color scheme
//!   duplicate a nearby home?
//! - **Price breakdown**: itemized total across base price, lot premium,
//!   selections, incentives, and change-order deltas.
//! - **Scenario status**: overall readiness of the configuration.
//! - **Filtered tree**: a keyword/category-filtered copy of the tree with
//!   per-node status derived bottom-up.
//!
//! The engine performs no I/O and never mutates its inputs; every
//! derivation is a free function over plain data, with an optional
//! [`DerivationEngine`] façade that memoizes on snapshot identity.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scenario_engine::{DerivationEngine, PointTypeFilter};
//! use std::sync::Arc;
//!
//! let mut engine = DerivationEngine::new();
//! engine.set_tree(Some(Arc::new(tree)));
//! engine.set_lot(Some(Arc::new(lot)));
//! engine.set_plan(Some(Arc::new(plan)));
//!
//! let conflict = engine.monotony_conflict();
//! let price = engine.price_breakdown();
//! let status = engine.scenario_status();
//! let view = engine.filtered_tree(None, PointTypeFilter::Structural);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Domain snapshots
pub mod agreement;
pub mod change_order;
pub mod error;
pub mod job;
pub mod lot;
pub mod tree;

// Derivations
pub mod filter;
pub mod ledger;
pub mod monotony;
pub mod pricing;
pub mod status;

// Facade
pub mod engine;
pub mod memo;

#[cfg(test)]
mod testkit;

// Re-export primary types at crate root for convenience
pub use agreement::{
    AdjustmentKind, AgreementStatus, PriceAdjustment, ProgramType, SalesAgreement, SalesProgram,
    ScenarioInfo,
};
pub use change_order::{
    AdjustmentDelta, ChangeOrder, NonStandardDelta, ProgramDelta, SubOrder,
};
pub use engine::DerivationEngine;
pub use error::ValidationError;
pub use filter::{
    FilterInput, FilterScope, FilteredChoice, FilteredGroup, FilteredPoint, FilteredSubGroup,
    FilteredTree, KeywordFilter, NodeStatus, PointTypeFilter, filter_tree,
};
pub use job::{Job, NonStandardOption, NonStandardOptionId};
pub use ledger::{DeltaAction, DeltaLedger};
pub use lot::{
    FinancialCommunity, Lot, LotId, MonotonyRule, MonotonyRuleType, PhasePlanPrice, Plan, PlanId,
    SalesPhase,
};
pub use memo::{ArcKey, MemoCell};
pub use monotony::{MonotonyConflict, MonotonyInput, detect_conflicts};
pub use pricing::{LiteOption, PriceBreakdown, PriceInput, base_plan_price, price_breakdown};
pub use status::{CompletenessFlags, ScenarioStatus, classify, point_is_fulfilled};
pub use tree::{
    AttributeId, Choice, ChoiceId, DecisionPoint, Group, GroupId, OptionsTree, PickType, PointId,
    PointKind, SelectedAttribute, SubGroup, SubGroupId,
};
