//! Change-order overlay.
//!
//! A change order never edits the agreement or job baseline in place. It is
//! a collection of typed sub-orders whose line items, tagged `Add` or
//! `Delete`, are folded over the baseline at derivation time.

use serde::{Deserialize, Serialize};

use crate::agreement::{AdjustmentKind, ProgramType};
use crate::job::NonStandardOptionId;
use crate::ledger::DeltaAction;
use crate::lot::PlanId;

/// A non-standard-option line item on a change order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonStandardDelta {
    /// Identity of the option being added or deleted. Deletes refer to an
    /// option already on the job baseline.
    pub option_id: NonStandardOptionId,
    /// Add or Delete.
    pub action: DeltaAction,
    /// Description of the one-off work.
    pub description: String,
    /// Unit price in whole currency units.
    pub unit_price: i64,
    /// Quantity.
    pub quantity: u32,
}

impl NonStandardDelta {
    /// Extended amount of this line (`unit_price × quantity`).
    #[must_use]
    pub const fn extended_price(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }
}

/// A sales-program line item on a price-adjustment sub-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDelta {
    /// Add or Delete.
    pub action: DeltaAction,
    /// Which incentive aggregate the amount lands in.
    pub program_type: ProgramType,
    /// Amount in whole currency units.
    pub amount: i64,
}

/// An agreement-adjustment line item on a price-adjustment sub-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentDelta {
    /// Add or Delete.
    pub action: DeltaAction,
    /// Which adjustment aggregate the amount lands in.
    pub kind: AdjustmentKind,
    /// Amount in whole currency units.
    pub amount: i64,
}

/// One typed sub-order inside a change order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubOrder {
    /// Adjusts agreement-level programs and price adjustments.
    PriceAdjustment {
        /// Sales-program deltas.
        #[serde(default)]
        programs: Vec<ProgramDelta>,
        /// Price-adjustment deltas.
        #[serde(default)]
        adjustments: Vec<AdjustmentDelta>,
    },

    /// Adds or deletes non-standard options on the job.
    NonStandard {
        /// Non-standard option deltas.
        #[serde(default)]
        options: Vec<NonStandardDelta>,
    },

    /// Switches the configuration to a different plan.
    PlanChange {
        /// The newly chosen plan, once picked.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_plan_id: Option<PlanId>,
    },

    /// Construction-side modifications with no price impact here.
    Construction,
}

/// An in-progress change order layered over the agreement/job baseline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeOrder {
    /// Change-order id.
    pub id: u32,
    /// Typed sub-orders.
    #[serde(default)]
    pub sub_orders: Vec<SubOrder>,
}

impl ChangeOrder {
    /// Returns true if this change order switches plans.
    #[must_use]
    pub fn is_plan_change(&self) -> bool {
        self.sub_orders
            .iter()
            .any(|so| matches!(so, SubOrder::PlanChange { .. }))
    }

    /// The new plan chosen by a plan-change sub-order, if any.
    #[must_use]
    pub fn new_plan_id(&self) -> Option<PlanId> {
        self.sub_orders.iter().find_map(|so| match so {
            SubOrder::PlanChange { new_plan_id } => *new_plan_id,
            _ => None,
        })
    }

    /// Iterates over non-standard option deltas across all sub-orders.
    pub fn non_standard_deltas(&self) -> impl Iterator<Item = &NonStandardDelta> {
        self.sub_orders.iter().flat_map(|so| match so {
            SubOrder::NonStandard { options } => options.as_slice(),
            _ => &[],
        })
    }

    /// Iterates over sales-program deltas across price-adjustment sub-orders.
    pub fn program_deltas(&self) -> impl Iterator<Item = &ProgramDelta> {
        self.sub_orders.iter().flat_map(|so| match so {
            SubOrder::PriceAdjustment { programs, .. } => programs.as_slice(),
            _ => &[],
        })
    }

    /// Iterates over adjustment deltas across price-adjustment sub-orders.
    pub fn adjustment_deltas(&self) -> impl Iterator<Item = &AdjustmentDelta> {
        self.sub_orders.iter().flat_map(|so| match so {
            SubOrder::PriceAdjustment { adjustments, .. } => adjustments.as_slice(),
            _ => &[],
        })
    }
}
