//! End-to-end tests: raw quote snapshot to schedule and costs.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use trainsched_core::{
    AreaCost, CatalogItem, DiagnosticCode, ItemRef, PlanSnapshot, QuoteSnapshot,
    RawRequirementRow, RawWeekendPolicy, Resource, ScheduleError, SchedulerConfig, StaggerPolicy,
};
use trainsched_solver::{plan_quote, plan_quotes, QuotePlanner};

fn workshop_quote() -> QuoteSnapshot {
    let mut quote = QuoteSnapshot::new(100, "Workshop retrofit");
    quote.area_id = Some(2);
    quote.areas = vec![
        AreaCost::new(1).name("Domestic").rates(dec!(60), dec!(10), dec!(5)),
        AreaCost::new(2).name("Abroad").rates(dec!(100), dec!(20), dec!(10)),
    ];
    quote.resources = vec![
        Resource::new(10).name("Alice").hourly_rate(dec!(50)),
        Resource::new(11).name("Bob").hourly_rate(dec!(40)),
    ];
    quote.items = vec![
        CatalogItem::new(ItemRef::Machine(1), "Lathe X200"),
        CatalogItem::new(ItemRef::Software(7), "CAM Suite")
            .weekend_override(RawWeekendPolicy::new(true, true)),
    ];
    quote.plans = vec![PlanSnapshot::new(1, "Operators")
        .row(RawRequirementRow::machine(10, 1, 20))
        .row(RawRequirementRow::software(10, 7, 4))
        .row(RawRequirementRow::software(11, 7, dec!(12.5)))];
    quote
}

fn codes(report: &trainsched_solver::QuoteReport) -> Vec<DiagnosticCode> {
    report.diagnostics().map(|d| d.code).collect()
}

#[test]
fn clean_quote_is_fully_priced() {
    let report = plan_quote(&workshop_quote()).unwrap();
    let plan = report.plan(1).unwrap();

    assert_eq!(plan.requirements.len(), 3);
    assert_eq!(plan.cost.summaries.len(), 2);
    assert_eq!(codes(&report), vec![DiagnosticCode::I001PlanScheduled]);

    // Alice: 24 hours at 50, starting on day 1 (10 % 5 == 0)
    let alice = plan.cost.summary_for(10).unwrap();
    assert_eq!(alice.total_hours, dec!(24));
    assert_eq!(alice.training_cost, dec!(1200));
    assert_eq!(alice.earliest_day.get(), 1);
    assert_eq!(alice.training_days, 3);

    // Bob: 12.5 hours at 40, starting on day 3 (2 * (11 % 5))
    let bob = plan.cost.summary_for(11).unwrap();
    assert_eq!(bob.training_cost, dec!(500));
    assert_eq!(bob.earliest_day.get(), 3);
    assert_eq!(bob.training_days, 2);
    assert_eq!(bob.business_trip_days, 4);
    assert_eq!(bob.trip_cost, dec!(520));

    assert_eq!(report.cost.training_cost, dec!(1700));
    assert!(!report.is_degraded());
}

#[test]
fn shared_resource_is_interleaved_across_items() {
    let report = plan_quote(&workshop_quote()).unwrap();
    let plan = report.plan(1).unwrap();

    // Alice: machine 20h on days 1..3 (8, 8, 4), software fills day 3
    let load = plan.schedule.daily_load(10);
    let per_day: Vec<_> = load.iter().map(|(d, h)| (d.get(), *h)).collect();
    assert_eq!(per_day, vec![(1, dec!(8)), (2, dec!(8)), (3, dec!(8))]);
}

#[test]
fn bad_rows_are_dropped_and_good_rows_still_scheduled() {
    let mut quote = workshop_quote();
    quote.plans[0].rows.push(RawRequirementRow::machine(10, 1, 0));
    quote.plans[0].rows.push(RawRequirementRow::machine(99, 1, 8));
    quote.plans[0].rows.push(RawRequirementRow {
        resource_id: Some(11),
        machine_id: Some(1),
        software_id: Some(7),
        hours: Some(dec!(8)),
    });

    let report = plan_quote(&quote).unwrap();
    let plan = report.plan(1).unwrap();
    assert_eq!(plan.requirements.len(), 3);
    assert_eq!(
        codes(&report),
        vec![
            DiagnosticCode::W001NonPositiveHours,
            DiagnosticCode::W003UnknownResource,
            DiagnosticCode::W004AmbiguousItem,
            DiagnosticCode::I001PlanScheduled,
        ]
    );
    assert_eq!(report.cost.training_cost, dec!(1700));
}

#[test]
fn missing_area_is_surfaced_as_degraded() {
    let mut quote = workshop_quote();
    quote.area_id = None;

    let report = plan_quote(&quote).unwrap();
    assert!(report.is_degraded());
    assert_eq!(report.cost.trip_cost, dec!(0));
    assert_eq!(report.cost.training_cost, dec!(1700));
    assert!(codes(&report).contains(&DiagnosticCode::W006NoAreaSelected));
}

#[test]
fn unknown_area_is_surfaced_as_degraded() {
    let mut quote = workshop_quote();
    quote.area_id = Some(42);

    let report = plan_quote(&quote).unwrap();
    assert!(report.is_degraded());
    assert!(codes(&report).contains(&DiagnosticCode::W007UnknownArea));
}

#[test]
fn negative_hourly_rate_is_surfaced_as_degraded() {
    let mut quote = workshop_quote();
    quote.resources[1] = Resource::new(11).name("Bob").hourly_rate(dec!(-50));

    let report = plan_quote(&quote).unwrap();
    assert!(report.is_degraded());
    assert!(report.cost.degraded);
    let bob = report.plan(1).unwrap().cost.summary_for(11).unwrap();
    assert_eq!(bob.training_cost, dec!(0));
    assert!(!bob.training_cost_complete);
    assert!(codes(&report).contains(&DiagnosticCode::W009NegativeRate));
}

#[test]
fn totals_sum_across_plans() {
    let mut quote = workshop_quote();
    quote.scheduler = SchedulerConfig::new().stagger(StaggerPolicy::None);
    quote.plans.push(
        PlanSnapshot::new(2, "Maintenance").row(RawRequirementRow::machine(11, 1, 8)),
    );

    let report = plan_quote(&quote).unwrap();
    let maintenance = report.plan(2).unwrap();
    assert_eq!(maintenance.cost.training_cost, dec!(320));
    assert_eq!(maintenance.cost.trip_cost, dec!(390));
    assert_eq!(
        report.cost.total_cost(),
        report.plans.iter().map(|p| p.cost.total_cost()).sum::<rust_decimal::Decimal>()
    );
}

#[test]
fn batch_matches_sequential_runs() {
    let mut second = workshop_quote();
    second.id = 101;
    second.area_id = None;
    let mut broken = workshop_quote();
    broken.id = 102;
    broken.weekend = RawWeekendPolicy::default();

    let quotes = vec![workshop_quote(), second.clone(), broken];
    let results = plan_quotes(&quotes);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &plan_quote(&quotes[0]).unwrap());
    assert_eq!(results[1].as_ref().unwrap(), &plan_quote(&second).unwrap());
    assert!(matches!(
        results[2],
        Err(ScheduleError::MalformedWeekendPolicy { .. })
    ));
}

#[test]
fn planner_config_overrides_snapshot_config() {
    let quote = workshop_quote();
    let planner = QuotePlanner::new(SchedulerConfig::new().stagger(StaggerPolicy::None));
    let report = planner.plan_quote(&quote).unwrap();
    let bob = report.plan(1).unwrap().cost.summary_for(11).unwrap();
    assert_eq!(bob.earliest_day.get(), 1);
}

#[test]
fn zero_ceiling_fails_the_quote() {
    let quote = workshop_quote();
    let planner = QuotePlanner::new(SchedulerConfig::new().daily_hour_ceiling(0));
    assert!(matches!(
        planner.plan_quote(&quote),
        Err(ScheduleError::InvalidHourCeiling(_))
    ));
}

#[test]
fn snapshot_with_twelve_hour_days_is_rejected() {
    let mut quote = workshop_quote();
    quote.scheduler = SchedulerConfig::new().daily_hour_ceiling(12);
    assert_eq!(
        plan_quote(&quote).unwrap_err(),
        ScheduleError::InvalidHourCeiling(dec!(12))
    );
}

#[test]
fn one_absurd_row_does_not_sink_the_quote() {
    let mut quote = workshop_quote();
    quote.plans[0]
        .rows
        .push(RawRequirementRow::machine(11, 1, dec!(1000000000000)));

    let report = plan_quote(&quote).unwrap();
    let plan = report.plan(1).unwrap();
    assert_eq!(plan.requirements.len(), 3);
    assert_eq!(report.cost.training_cost, dec!(1700));
    assert!(codes(&report).contains(&DiagnosticCode::W011ExcessiveHours));
}
