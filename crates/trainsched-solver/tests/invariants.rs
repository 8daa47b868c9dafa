//! Scheduler and projector invariants over a mixed workload.
//!
//! The workload mixes fractional hours, several items per resource, repeated
//! items and all four weekend policies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use trainsched_core::{
    AreaCost, ItemRef, Resource, ScheduleOutcome, Scheduler, SchedulerConfig, StaggerPolicy,
    SyntheticDay, TrainingRequirement, WeekendPolicy,
};
use trainsched_solver::{AreaRate, CostProjector, DayScheduler};

fn hour_choices() -> [Decimal; 9] {
    [
        dec!(0.5),
        dec!(3),
        dec!(7.25),
        dec!(8),
        dec!(13),
        dec!(16),
        dec!(21.5),
        dec!(40),
        dec!(63.75),
    ]
}

const POLICIES: [WeekendPolicy; 4] = [
    WeekendPolicy::weekdays_only(),
    WeekendPolicy::new(true, false),
    WeekendPolicy::new(false, true),
    WeekendPolicy::every_day(),
];

fn workload() -> Vec<TrainingRequirement> {
    let hours = hour_choices();
    let mut requirements = Vec::new();
    for resource_id in 1..=7u64 {
        for slot in 0..5usize {
            let n = resource_id as usize * 5 + slot;
            let item = if slot % 2 == 0 {
                ItemRef::Machine((slot % 3) as u64)
            } else {
                ItemRef::Software((n % 4) as u64)
            };
            requirements.push(
                TrainingRequirement::new(resource_id, item)
                    .hours(hours[n % hours.len()])
                    .weekend(POLICIES[n % POLICIES.len()]),
            );
        }
    }
    requirements
}

fn schedulers() -> Vec<DayScheduler> {
    vec![
        DayScheduler::default(),
        DayScheduler::new(SchedulerConfig::new().stagger(StaggerPolicy::None)),
        DayScheduler::new(SchedulerConfig::new().stagger(StaggerPolicy::Spread {
            rank_step: 5,
            resource_step: 1,
            resource_modulus: 3,
        })),
    ]
}

fn run(scheduler: &DayScheduler) -> ScheduleOutcome {
    scheduler.schedule(&workload()).unwrap()
}

#[test]
fn conservation_of_hours() {
    let requirements = workload();
    for scheduler in schedulers() {
        let outcome = run(&scheduler);
        for (index, requirement) in requirements.iter().enumerate() {
            assert_eq!(
                outcome.scheduled_hours(index),
                requirement.required_hours,
                "requirement {} lost or gained hours",
                index
            );
        }
    }
}

#[test]
fn segments_respect_the_daily_ceiling() {
    for scheduler in schedulers() {
        let outcome = run(&scheduler);
        for segment in &outcome.segments {
            assert!(segment.segment_hours > Decimal::ZERO);
            assert!(segment.segment_hours <= dec!(8));
            assert_eq!(segment.duration_days, 1);
        }

        let mut load: BTreeMap<(u64, SyntheticDay), Decimal> = BTreeMap::new();
        for segment in &outcome.segments {
            *load.entry((segment.resource_id, segment.start_day)).or_default() +=
                segment.segment_hours;
        }
        for ((resource_id, day), hours) in load {
            assert!(
                hours <= dec!(8),
                "resource {} scheduled for {} hours on day {}",
                resource_id,
                hours,
                day.get()
            );
        }
    }
}

#[test]
fn weekend_policy_is_honoured() {
    let requirements = workload();
    for scheduler in schedulers() {
        let outcome = run(&scheduler);
        for segment in &outcome.segments {
            let policy = requirements[segment.requirement_index].weekend;
            assert!(
                policy.is_working_day(segment.start_day),
                "segment on day {} violates {:?}",
                segment.start_day.get(),
                policy
            );
            if policy == WeekendPolicy::weekdays_only() {
                let rem = segment.start_day.get() % 7;
                assert!(rem != 6 && rem != 0);
            }
        }
    }
}

#[test]
fn scheduling_is_deterministic() {
    for scheduler in schedulers() {
        let first = serde_json::to_vec(&run(&scheduler)).unwrap();
        let second = serde_json::to_vec(&run(&scheduler)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn segments_carry_their_requirement() {
    let requirements = workload();
    let outcome = run(&DayScheduler::default());
    for segment in &outcome.segments {
        let requirement = &requirements[segment.requirement_index];
        assert_eq!(segment.resource_id, requirement.resource_id);
        assert_eq!(segment.item, requirement.item);
        assert_eq!(segment.total_requirement_hours, requirement.required_hours);
    }
}

#[test]
fn trip_span_covers_training_days() {
    let resources: Vec<_> = (1..=7u64)
        .map(|id| Resource::new(id).hourly_rate(dec!(42.5)))
        .collect();
    let area = AreaCost::new(1).rates(dec!(80), dec!(15), dec!(5));
    let projector = CostProjector::new(&SchedulerConfig::default()).unwrap();

    for scheduler in schedulers() {
        let outcome = run(&scheduler);
        let projection =
            projector.project(1, &outcome.segments, &resources, AreaRate::Selected(&area));
        assert_eq!(projection.cost.summaries.len(), 7);
        for summary in &projection.cost.summaries {
            assert!(summary.business_trip_days >= summary.training_days);
            assert_eq!(
                summary.business_trip_days,
                summary.latest_day.get() - summary.earliest_day.get() + 3
            );
            assert_eq!(summary.training_cost, dec!(42.5) * summary.total_hours);
            assert_eq!(
                summary.trip_cost,
                dec!(100) * Decimal::from(summary.business_trip_days)
            );
        }
    }
}
