use std::sync::Arc;

use pretty_assertions::assert_eq;

use scenario_engine::{
    AdjustmentDelta, AdjustmentKind, AgreementStatus, ChangeOrder, Choice, ChoiceId,
    DecisionPoint, DeltaAction, DerivationEngine, FinancialCommunity, Group, GroupId, Job, Lot,
    LotId, MonotonyConflict, MonotonyRule, MonotonyRuleType, NonStandardDelta, NonStandardOption,
    NonStandardOptionId, OptionsTree, PickType, Plan, PlanId, PointId, PointKind, PointTypeFilter,
    PriceBreakdown, ProgramType, SalesAgreement, SalesProgram, ScenarioStatus, SubGroup,
    SubGroupId, SubOrder,
};

fn simple_choice(id: u32, label: &str, quantity: u32, price: i64) -> Choice {
    Choice {
        id: ChoiceId(id),
        label: label.to_string(),
        quantity,
        price,
        enabled: true,
        override_note: None,
        required_attributes: 0,
        selected_attributes: Vec::new(),
    }
}

fn simple_point(id: u32, label: &str, kind: PointKind, choices: Vec<Choice>) -> DecisionPoint {
    DecisionPoint {
        id: PointId(id),
        label: label.to_string(),
        kind,
        pick_type: PickType::Pick1,
        is_structural_item: false,
        is_quick_quote_item: false,
        is_past_cut_off: false,
        enabled: true,
        viewed: false,
        completed: false,
        choices,
    }
}

fn tree_of(points: Vec<DecisionPoint>) -> OptionsTree {
    OptionsTree::new(vec![Group {
        id: GroupId(1),
        label: "Exterior".to_string(),
        sub_groups: vec![SubGroup {
            id: SubGroupId(1),
            label: "Facade".to_string(),
            points,
        }],
    }])
}

fn plain_lot(premium: i64, rules: Vec<MonotonyRule>) -> Lot {
    Lot {
        id: LotId(100),
        premium,
        monotony_rules: rules,
        financial_community: FinancialCommunity::default(),
        sales_phase: None,
    }
}

fn elevation_rule(plan: u32, elevation: u32) -> MonotonyRule {
    MonotonyRule {
        rule_type: MonotonyRuleType::Elevation,
        plan_id: PlanId(plan),
        elevation_choice_id: Some(ChoiceId(elevation)),
        color_scheme_choice_id: None,
        color_scheme_attribute_ids: Vec::new(),
    }
}

#[test]
fn golden_price_breakdown_regression() {
    // Plan base 12999, lot premium 50000, one selected choice at 34, a
    // flat-discount program of 50, a change order carrying a closing-cost
    // add of 75 and a non-standard add of 65x4, and a job non-standard
    // option of 40x3.
    let tree = tree_of(vec![simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![simple_choice(11, "E1", 1, 34)],
    )]);

    let agreement = SalesAgreement {
        id: Some(1),
        status: AgreementStatus::Approved,
        sale_price: 0,
        programs: vec![SalesProgram {
            program_type: ProgramType::DiscountFlatAmount,
            amount: 50,
        }],
        price_adjustments: Vec::new(),
        signed_date: None,
        approved_date: None,
    };

    let change_order = ChangeOrder {
        id: 9,
        sub_orders: vec![
            SubOrder::PriceAdjustment {
                programs: Vec::new(),
                adjustments: vec![AdjustmentDelta {
                    action: DeltaAction::Add,
                    kind: AdjustmentKind::ClosingCost,
                    amount: 75,
                }],
            },
            SubOrder::NonStandard {
                options: vec![NonStandardDelta {
                    option_id: NonStandardOptionId(2),
                    action: DeltaAction::Add,
                    description: "Outdoor kitchen rough-in".to_string(),
                    unit_price: 65,
                    quantity: 4,
                }],
            },
        ],
    };

    let job = Job {
        id: 77,
        non_standard_options: vec![NonStandardOption {
            id: NonStandardOptionId(1),
            description: "Custom cellar door".to_string(),
            unit_price: 40,
            quantity: 3,
        }],
    };

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree)));
    engine.set_lot(Some(Arc::new(plain_lot(50000, Vec::new()))));
    engine.set_plan(Some(Arc::new(Plan {
        id: PlanId(5),
        price: 12999,
    })));
    engine.set_agreement(Some(Arc::new(agreement)));
    engine.set_change_order(Some(Arc::new(change_order)));
    engine.set_job(Some(Arc::new(job)));

    let expected = PriceBreakdown {
        base_house: 12999,
        homesite: 50000,
        selections: 34,
        non_standard_selections: 120 + 260,
        sales_program: 50,
        closing_incentive: 0,
        price_adjustments: 0,
        closing_cost_adjustment: 75,
        homesite_estimate: 0,
        design_estimate: 0,
        total_price: 63438,
        change_price: 335,
        favorites_price: 0,
    };
    assert_eq!(engine.price_breakdown(), expected);
}

#[test]
fn elevation_conflict_flags_the_selection() {
    // Elevation E1 (price 34, quantity 1) selected; the lot's rule ties
    // plan 5 to E1 with no override.
    let tree = tree_of(vec![simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![simple_choice(11, "E1", 1, 34)],
    )]);

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree)));
    engine.set_lot(Some(Arc::new(plain_lot(0, vec![elevation_rule(5, 11)]))));
    engine.set_plan(Some(Arc::new(Plan {
        id: PlanId(5),
        price: 12999,
    })));

    let conflict = engine.monotony_conflict();
    assert!(conflict.elevation_conflict);
    assert!(conflict.monotony_conflict);
}

#[test]
fn override_note_clears_the_elevation_conflict() {
    let mut e1 = simple_choice(11, "E1", 1, 34);
    e1.override_note = Some("to be determined".to_string());
    let tree = tree_of(vec![simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![e1],
    )]);

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree)));
    engine.set_lot(Some(Arc::new(plain_lot(0, vec![elevation_rule(5, 11)]))));
    engine.set_plan(Some(Arc::new(Plan {
        id: PlanId(5),
        price: 12999,
    })));

    let conflict = engine.monotony_conflict();
    assert!(!conflict.elevation_conflict);
    assert!(!conflict.monotony_conflict);
    assert!(conflict.elevation_conflict_override);
}

#[test]
fn monotony_conflict_dominates_scenario_status() {
    let tree = tree_of(vec![simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![simple_choice(11, "E1", 1, 34)],
    )]);

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree)));
    engine.set_lot(Some(Arc::new(plain_lot(0, vec![elevation_rule(5, 11)]))));
    engine.set_plan(Some(Arc::new(Plan {
        id: PlanId(5),
        price: 12999,
    })));

    assert_eq!(engine.scenario_status(), ScenarioStatus::MonotonyConflict);
}

#[test]
fn structural_filter_drops_non_structural_branches() {
    let mut structural = simple_point(
        1,
        "Foundation",
        PointKind::Standard,
        vec![simple_choice(11, "Walkout Basement", 1, 9000)],
    );
    structural.is_structural_item = true;
    let non_structural = simple_point(
        2,
        "Flooring",
        PointKind::Standard,
        vec![simple_choice(21, "Oak Hardwood", 0, 2200)],
    );

    // Two separate groups so the empty one must be dropped, not hidden.
    let tree = OptionsTree::new(vec![
        Group {
            id: GroupId(1),
            label: "Structure".to_string(),
            sub_groups: vec![SubGroup {
                id: SubGroupId(1),
                label: "Basement".to_string(),
                points: vec![structural],
            }],
        },
        Group {
            id: GroupId(2),
            label: "Interior".to_string(),
            sub_groups: vec![SubGroup {
                id: SubGroupId(2),
                label: "Floors".to_string(),
                points: vec![non_structural],
            }],
        },
    ]);

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree)));

    let filtered = engine.filtered_tree(None, PointTypeFilter::Structural);
    assert_eq!(filtered.groups.len(), 1);
    assert_eq!(filtered.groups[0].id, GroupId(1));
    assert_eq!(filtered.groups[0].sub_groups.len(), 1);
    assert_eq!(filtered.groups[0].sub_groups[0].points.len(), 1);
    assert_eq!(filtered.groups[0].sub_groups[0].points[0].id, PointId(1));
}

#[test]
fn ready_to_build_once_every_point_is_fulfilled() {
    let mut elevation = simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![simple_choice(11, "E1", 1, 34)],
    );
    elevation.completed = true;
    let mut color_scheme = simple_point(
        2,
        "Color Scheme",
        PointKind::ColorScheme,
        vec![simple_choice(21, "Coastal", 1, 0)],
    );
    color_scheme.completed = true;

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree_of(vec![elevation, color_scheme]))));
    engine.set_lot(Some(Arc::new(plain_lot(0, Vec::new()))));
    engine.set_plan(Some(Arc::new(Plan {
        id: PlanId(5),
        price: 12999,
    })));

    assert_eq!(engine.monotony_conflict(), MonotonyConflict::none());
    assert_eq!(engine.scenario_status(), ScenarioStatus::ReadyToBuild);
}

#[test]
fn plan_change_hides_everything_but_elevation_and_color_scheme() {
    let elevation = simple_point(
        1,
        "Elevation",
        PointKind::Elevation,
        vec![simple_choice(11, "E1", 1, 34)],
    );
    let flooring = simple_point(
        2,
        "Flooring",
        PointKind::Standard,
        vec![simple_choice(21, "Oak Hardwood", 0, 2200)],
    );

    let mut engine = DerivationEngine::new();
    engine.set_tree(Some(Arc::new(tree_of(vec![elevation, flooring]))));
    engine.set_change_order(Some(Arc::new(ChangeOrder {
        id: 3,
        sub_orders: vec![SubOrder::PlanChange {
            new_plan_id: Some(PlanId(8)),
        }],
    })));

    let filtered = engine.filtered_tree(None, PointTypeFilter::Full);
    let points = &filtered.groups[0].sub_groups[0].points;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].kind, PointKind::Elevation);
}
