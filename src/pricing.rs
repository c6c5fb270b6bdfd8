//! Price breakdown aggregator.
//!
//! Reconciles every pricing source into one itemized record: plan base
//! price (flat or phase), lot premium, selected options, job non-standard
//! options, agreement programs and adjustments, change-order deltas, and
//! draft-scenario estimates. All money is `i64` whole currency units and
//! every term is summed before any formatting happens.
//!
//! `change_price` is tracked as a running delta while the change order is
//! folded in, not recomputed by diffing two full walks.

use serde::{Deserialize, Serialize};

use crate::agreement::{AdjustmentKind, ProgramType, SalesAgreement, ScenarioInfo};
use crate::change_order::ChangeOrder;
use crate::job::Job;
use crate::ledger::DeltaLedger;
use crate::lot::{Lot, Plan};
use crate::tree::OptionsTree;

/// Itemized price of the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Plan base price (flat or phase).
    pub base_house: i64,
    /// Lot premium.
    pub homesite: i64,
    /// Selected catalog options.
    pub selections: i64,
    /// Non-standard options (job baseline plus change-order deltas).
    pub non_standard_selections: i64,
    /// Flat-discount sales programs.
    pub sales_program: i64,
    /// Buyer's-closing-cost programs.
    pub closing_incentive: i64,
    /// Agreement discount adjustments.
    pub price_adjustments: i64,
    /// Agreement closing-cost adjustments.
    pub closing_cost_adjustment: i64,
    /// Draft homesite estimate.
    pub homesite_estimate: i64,
    /// Draft design estimate.
    pub design_estimate: i64,
    /// Full configuration price.
    pub total_price: i64,
    /// Portion of `total_price` attributable to the active change order.
    pub change_price: i64,
    /// Price contributed by the favorites subsystem, when one is wired in.
    pub favorites_price: i64,
}

/// A flattened option in the Lite product variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteOption {
    /// Options in the "base house" category are priced into `base_house`,
    /// not `selections`.
    pub is_base_house: bool,
    /// List price in whole currency units.
    pub list_price: i64,
    /// Selected quantity.
    pub quantity: u32,
}

/// Inputs to a price-breakdown evaluation. Every field is optional; absent
/// sources contribute zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceInput<'a> {
    /// Options tree, for selected choice prices.
    pub tree: Option<&'a OptionsTree>,
    /// Selected plan.
    pub plan: Option<&'a Plan>,
    /// Selected lot, for the premium and phase pricing.
    pub lot: Option<&'a Lot>,
    /// Active sales agreement.
    pub agreement: Option<&'a SalesAgreement>,
    /// Active change order, if one is in progress.
    pub change_order: Option<&'a ChangeOrder>,
    /// Job record, for existing non-standard options.
    pub job: Option<&'a Job>,
    /// Draft estimates; override the computed incentive amounts.
    pub scenario_info: Option<&'a ScenarioInfo>,
    /// Lite-variant option list; when present, `selections` is computed
    /// from it instead of the tree.
    pub lite_options: Option<&'a [LiteOption]>,
    /// Price supplied by the favorites subsystem, if any.
    pub favorites_price: i64,
}

/// Resolves the plan's base price.
///
/// The phase price wins only when the lot's active sales phase prices this
/// plan, the community has phased pricing enabled, and the agreement is
/// still `Pending` or unsaved (no agreement counts as unsaved). Everything
/// else falls back to the plan's flat price; no plan prices to 0.
#[must_use]
pub fn base_plan_price(
    plan: Option<&Plan>,
    lot: Option<&Lot>,
    agreement: Option<&SalesAgreement>,
) -> i64 {
    let Some(plan) = plan else {
        return 0;
    };

    let phase_price = lot.and_then(|lot| {
        if !lot.financial_community.is_phased_pricing_enabled {
            return None;
        }
        lot.sales_phase.as_ref()?.price_for_plan(plan.id)
    });

    match phase_price {
        Some(price) if agreement.map_or(true, SalesAgreement::is_pending_or_unsaved) => price,
        _ => plan.price,
    }
}

/// Aggregates every pricing source into one breakdown.
#[must_use]
pub fn price_breakdown(input: &PriceInput<'_>) -> PriceBreakdown {
    let mut breakdown = PriceBreakdown {
        base_house: base_plan_price(input.plan, input.lot, input.agreement),
        homesite: input.lot.map_or(0, |lot| lot.premium),
        favorites_price: input.favorites_price,
        ..PriceBreakdown::default()
    };

    breakdown.selections = match input.lite_options {
        Some(options) => options
            .iter()
            .filter(|o| !o.is_base_house)
            .map(|o| o.list_price * i64::from(o.quantity))
            .sum(),
        None => input.tree.map_or(0, OptionsTree::selections_total),
    };

    // Agreement-level programs and adjustments.
    if let Some(agreement) = input.agreement {
        for program in &agreement.programs {
            match program.program_type {
                ProgramType::BuyersClosingCost => breakdown.closing_incentive += program.amount,
                ProgramType::DiscountFlatAmount => breakdown.sales_program += program.amount,
            }
        }
        for adjustment in &agreement.price_adjustments {
            match adjustment.kind {
                AdjustmentKind::Discount => breakdown.price_adjustments += adjustment.amount,
                AdjustmentKind::ClosingCost => {
                    breakdown.closing_cost_adjustment += adjustment.amount;
                }
            }
        }
    }

    // Non-standard options: job baseline folded with change-order deltas.
    let mut non_standard = DeltaLedger::with_baseline(
        input
            .job
            .map(|job| job.non_standard_options.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|nso| (nso.id, nso.extended_price())),
    );

    // Running delta of the change order's effect on total_price.
    let mut change_price = 0;

    if let Some(change_order) = input.change_order {
        for delta in change_order.non_standard_deltas() {
            non_standard.apply(delta.option_id, delta.action, delta.extended_price());
        }
        change_price += non_standard.delta();

        for delta in change_order.program_deltas() {
            let amount = delta.action.signed(delta.amount);
            match delta.program_type {
                ProgramType::BuyersClosingCost => breakdown.closing_incentive += amount,
                ProgramType::DiscountFlatAmount => breakdown.sales_program += amount,
            }
            // Programs reduce buyer price, so the change order's effect on
            // the total runs opposite to the aggregate it feeds. When draft
            // estimates override the program aggregates below, these deltas
            // never reach the total and stay out of change_price too.
            if input.scenario_info.is_none() {
                change_price -= amount;
            }
        }

        for delta in change_order.adjustment_deltas() {
            let amount = delta.action.signed(delta.amount);
            match delta.kind {
                AdjustmentKind::Discount => breakdown.price_adjustments += amount,
                AdjustmentKind::ClosingCost => breakdown.closing_cost_adjustment += amount,
            }
            change_price += amount;
        }
    }
    breakdown.non_standard_selections = non_standard.total();

    // Draft estimates trump computed incentives until an agreement commits.
    if let Some(info) = input.scenario_info {
        breakdown.design_estimate = info.design_estimate;
        breakdown.homesite_estimate = info.homesite_estimate;
        breakdown.closing_incentive = info.closing_incentive;
        breakdown.sales_program = info.discount;
    }

    breakdown.total_price = breakdown.base_house
        + breakdown.homesite
        + breakdown.selections
        + breakdown.non_standard_selections
        + breakdown.price_adjustments
        + breakdown.closing_cost_adjustment
        - breakdown.sales_program
        - breakdown.closing_incentive;
    breakdown.change_price = change_price;

    breakdown
}
