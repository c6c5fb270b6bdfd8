//! Engine façade.
//!
//! `DerivationEngine` bundles the upstream snapshots (tree, lot, plan,
//! agreement, change order, job, draft scenario) behind one handle and
//! exposes the four derived facts through reference-identity memo cells.
//! Swapping a snapshot replaces its `Arc`, which invalidates exactly the
//! facts that read it; everything else keeps serving cached values.
//!
//! The engine is a convenience shell: every derivation is also available as
//! a free function for callers that manage their own snapshots.

use std::sync::Arc;

use tracing::debug;

use crate::agreement::{SalesAgreement, ScenarioInfo};
use crate::change_order::ChangeOrder;
use crate::filter::{FilterInput, FilteredTree, KeywordFilter, PointTypeFilter, filter_tree};
use crate::job::Job;
use crate::lot::{Lot, Plan};
use crate::memo::{ArcKey, MemoCell};
use crate::monotony::{MonotonyConflict, MonotonyInput, detect_conflicts};
use crate::pricing::{LiteOption, PriceBreakdown, PriceInput, price_breakdown};
use crate::status::{CompletenessFlags, ScenarioStatus, classify};
use crate::tree::{DecisionPoint, OptionsTree, PointKind};

#[derive(PartialEq, Eq)]
struct MonotonyKey {
    tree: ArcKey<OptionsTree>,
    lot: ArcKey<Lot>,
    plan: ArcKey<Plan>,
    change_order: ArcKey<ChangeOrder>,
    advisement_shown: bool,
}

#[derive(PartialEq, Eq)]
struct PriceKey {
    tree: ArcKey<OptionsTree>,
    lot: ArcKey<Lot>,
    plan: ArcKey<Plan>,
    agreement: ArcKey<SalesAgreement>,
    change_order: ArcKey<ChangeOrder>,
    job: ArcKey<Job>,
    scenario_info: ArcKey<ScenarioInfo>,
    lite_options: ArcKey<Vec<LiteOption>>,
    favorites_price: i64,
}

#[derive(PartialEq, Eq)]
struct StatusKey {
    monotony: MonotonyKey,
    agreement: ArcKey<SalesAgreement>,
}

#[derive(PartialEq, Eq)]
struct FilterKey {
    monotony: MonotonyKey,
    keyword: Option<KeywordFilter>,
    point_type: PointTypeFilter,
}

/// Bundles the upstream snapshots and memoizes the derived facts.
#[derive(Debug, Default)]
pub struct DerivationEngine {
    tree: Option<Arc<OptionsTree>>,
    lot: Option<Arc<Lot>>,
    plan: Option<Arc<Plan>>,
    agreement: Option<Arc<SalesAgreement>>,
    change_order: Option<Arc<ChangeOrder>>,
    job: Option<Arc<Job>>,
    scenario_info: Option<Arc<ScenarioInfo>>,
    lite_options: Option<Arc<Vec<LiteOption>>>,
    favorites_price: i64,
    advisement_shown: bool,

    monotony_cell: MemoCell<MonotonyKey, MonotonyConflict>,
    price_cell: MemoCell<PriceKey, PriceBreakdown>,
    status_cell: MemoCell<StatusKey, ScenarioStatus>,
    filter_cell: MemoCell<FilterKey, Arc<FilteredTree>>,
}

impl DerivationEngine {
    /// Creates an engine with no snapshots; every fact derives from empty
    /// inputs until snapshots are supplied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the options tree snapshot.
    pub fn set_tree(&mut self, tree: Option<Arc<OptionsTree>>) {
        self.tree = tree;
    }

    /// Replaces the lot snapshot.
    pub fn set_lot(&mut self, lot: Option<Arc<Lot>>) {
        self.lot = lot;
    }

    /// Replaces the plan snapshot.
    pub fn set_plan(&mut self, plan: Option<Arc<Plan>>) {
        self.plan = plan;
    }

    /// Replaces the sales-agreement snapshot.
    pub fn set_agreement(&mut self, agreement: Option<Arc<SalesAgreement>>) {
        self.agreement = agreement;
    }

    /// Replaces the change-order snapshot.
    pub fn set_change_order(&mut self, change_order: Option<Arc<ChangeOrder>>) {
        self.change_order = change_order;
    }

    /// Replaces the job snapshot.
    pub fn set_job(&mut self, job: Option<Arc<Job>>) {
        self.job = job;
    }

    /// Replaces the draft scenario estimates.
    pub fn set_scenario_info(&mut self, scenario_info: Option<Arc<ScenarioInfo>>) {
        self.scenario_info = scenario_info;
    }

    /// Replaces the Lite-variant option list.
    pub fn set_lite_options(&mut self, lite_options: Option<Arc<Vec<LiteOption>>>) {
        self.lite_options = lite_options;
    }

    /// Sets the price supplied by the favorites subsystem.
    pub fn set_favorites_price(&mut self, favorites_price: i64) {
        self.favorites_price = favorites_price;
    }

    /// Records whether the monotony advisement has been shown.
    pub fn set_advisement_shown(&mut self, shown: bool) {
        self.advisement_shown = shown;
    }

    fn elevation_point(&self) -> Option<&DecisionPoint> {
        self.tree.as_deref()?.point_of_kind(PointKind::Elevation)
    }

    fn color_scheme_point(&self) -> Option<&DecisionPoint> {
        self.tree.as_deref()?.point_of_kind(PointKind::ColorScheme)
    }

    fn monotony_key(&self) -> MonotonyKey {
        MonotonyKey {
            tree: ArcKey::of(self.tree.as_ref()),
            lot: ArcKey::of(self.lot.as_ref()),
            plan: ArcKey::of(self.plan.as_ref()),
            change_order: ArcKey::of(self.change_order.as_ref()),
            advisement_shown: self.advisement_shown,
        }
    }

    /// Plan id in effect: a plan-change change order's new plan wins over
    /// the selected plan snapshot.
    fn effective_plan_id(&self) -> Option<crate::lot::PlanId> {
        self.change_order
            .as_deref()
            .and_then(ChangeOrder::new_plan_id)
            .or_else(|| self.plan.as_deref().map(|p| p.id))
    }

    /// The current monotony conflict result.
    #[must_use]
    pub fn monotony_conflict(&self) -> MonotonyConflict {
        self.monotony_cell.get_or_compute(self.monotony_key(), || {
            debug!("deriving monotony conflicts");
            detect_conflicts(&MonotonyInput {
                lot: self.lot.as_deref(),
                plan_id: self.effective_plan_id(),
                elevation_point: self.elevation_point(),
                color_scheme_point: self.color_scheme_point(),
                advisement_shown: self.advisement_shown,
            })
        })
    }

    /// The current itemized price breakdown.
    #[must_use]
    pub fn price_breakdown(&self) -> PriceBreakdown {
        let key = PriceKey {
            tree: ArcKey::of(self.tree.as_ref()),
            lot: ArcKey::of(self.lot.as_ref()),
            plan: ArcKey::of(self.plan.as_ref()),
            agreement: ArcKey::of(self.agreement.as_ref()),
            change_order: ArcKey::of(self.change_order.as_ref()),
            job: ArcKey::of(self.job.as_ref()),
            scenario_info: ArcKey::of(self.scenario_info.as_ref()),
            lite_options: ArcKey::of(self.lite_options.as_ref()),
            favorites_price: self.favorites_price,
        };
        self.price_cell.get_or_compute(key, || {
            debug!("deriving price breakdown");
            price_breakdown(&PriceInput {
                tree: self.tree.as_deref(),
                plan: self.plan.as_deref(),
                lot: self.lot.as_deref(),
                agreement: self.agreement.as_deref(),
                change_order: self.change_order.as_deref(),
                job: self.job.as_deref(),
                scenario_info: self.scenario_info.as_deref(),
                lite_options: self.lite_options.as_deref().map(Vec::as_slice),
                favorites_price: self.favorites_price,
            })
        })
    }

    /// Completeness predicates derived from the snapshots.
    ///
    /// Lot and plan count as present when an agreement already exists, when
    /// the snapshot is supplied, or when a plan-change change order has its
    /// new plan picked.
    #[must_use]
    pub fn completeness_flags(&self) -> CompletenessFlags {
        let has_agreement = self.agreement.is_some();
        let plan_change = self
            .change_order
            .as_deref()
            .is_some_and(ChangeOrder::is_plan_change);
        let new_plan_picked = self
            .change_order
            .as_deref()
            .and_then(ChangeOrder::new_plan_id)
            .is_some();

        let has_elevation = self
            .elevation_point()
            .and_then(DecisionPoint::selected_choice)
            .is_some();
        let has_color_scheme = self
            .color_scheme_point()
            .and_then(DecisionPoint::selected_choice)
            .is_some()
            || self
                .elevation_point()
                .and_then(DecisionPoint::selected_choice)
                .is_some_and(|c| !c.selected_attributes.is_empty());

        CompletenessFlags {
            has_lot: has_agreement || self.lot.is_some(),
            has_plan: has_agreement || self.plan.is_some() || new_plan_picked,
            has_elevation,
            has_color_scheme,
            needs_plan_change: plan_change && !new_plan_picked,
        }
    }

    /// The current scenario status.
    #[must_use]
    pub fn scenario_status(&self) -> ScenarioStatus {
        let key = StatusKey {
            monotony: self.monotony_key(),
            agreement: ArcKey::of(self.agreement.as_ref()),
        };
        self.status_cell.get_or_compute(key, || {
            debug!("deriving scenario status");
            let conflict = self.monotony_conflict();
            classify(self.tree.as_deref(), &conflict, &self.completeness_flags())
        })
    }

    /// The filtered, annotated tree for the given view selection.
    #[must_use]
    pub fn filtered_tree(
        &self,
        keyword: Option<&KeywordFilter>,
        point_type: PointTypeFilter,
    ) -> Arc<FilteredTree> {
        let key = FilterKey {
            monotony: self.monotony_key(),
            keyword: keyword.cloned(),
            point_type,
        };
        self.filter_cell.get_or_compute(key, || {
            debug!(?point_type, "deriving filtered tree");
            let conflict = self.monotony_conflict();
            let plan_change_active = self
                .change_order
                .as_deref()
                .is_some_and(ChangeOrder::is_plan_change);
            let tree = self.tree.as_deref();
            Arc::new(tree.map_or_else(FilteredTree::default, |tree| {
                filter_tree(
                    tree,
                    &FilterInput {
                        keyword,
                        point_type,
                        conflict: &conflict,
                        plan_change_active,
                    },
                )
            }))
        })
    }
}
