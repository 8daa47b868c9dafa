//! Day-Based Scheduler
//!
//! Greedy allocator that lays requirements out as single-day segments.
//!
//! # Algorithm
//!
//! 1. Group requirements by resource (ascending resource id).
//! 2. Within a resource, order by item, then by input position. The input
//!    position is the per-item sequence index, so the layout is reproducible.
//! 3. Each resource owns one cursor (`day`, `hours_used`). All its requirements
//!    share it, which is what keeps two items on the same resource from
//!    exceeding the daily ceiling on a shared day.
//! 4. Before an assignment starts, the cursor is pushed forward to the
//!    assignment's staggered start day if it has not already passed it.
//! 5. Per day: skip non-working days under the requirement's weekend policy,
//!    otherwise allocate `min(ceiling - hours_used, remaining)` and emit a
//!    segment. A full day moves the cursor to the next day.
//!
//! Requirements with no positive hours (W001) or more than
//! [`MAX_REQUIREMENT_HOURS`] (W011) are skipped, which bounds the segments
//! emitted per requirement.
//!
//! This is a fixed-policy allocator, not an optimizer: it never reorders work
//! to shorten the overall span.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};
use trainsched_core::{
    Diagnostic, DiagnosticCode, ItemRef, ResourceId, ScheduleError, ScheduleOutcome,
    ScheduledTaskSegment, Scheduler, SchedulerConfig, Subject, SyntheticDay, TrainingRequirement,
    MAX_REQUIREMENT_HOURS,
};

/// Allocation state of one resource
#[derive(Debug, Clone)]
struct ResourceCursor {
    day: SyntheticDay,
    hours_used: Decimal,
    ceiling: Decimal,
}

impl ResourceCursor {
    fn new(ceiling: Decimal) -> Self {
        Self {
            day: SyntheticDay::FIRST,
            hours_used: Decimal::ZERO,
            ceiling,
        }
    }

    /// Move to `day` unless the cursor is already there or later
    fn start_no_earlier_than(&mut self, day: SyntheticDay) {
        if day > self.day {
            self.day = day;
            self.hours_used = Decimal::ZERO;
        }
    }

    fn advance(&mut self) {
        self.day = self.day.succ();
        self.hours_used = Decimal::ZERO;
    }

    fn available(&self) -> Decimal {
        self.ceiling - self.hours_used
    }

    fn consume(&mut self, hours: Decimal) {
        self.hours_used += hours;
        if self.hours_used >= self.ceiling {
            self.advance();
        }
    }
}

/// Day-bounded greedy scheduler with a shared per-resource cursor
#[derive(Debug, Clone, Default)]
pub struct DayScheduler {
    config: SchedulerConfig,
}

impl DayScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Allocate one requirement starting at the cursor
    fn allocate(
        &self,
        index: usize,
        requirement: &TrainingRequirement,
        cursor: &mut ResourceCursor,
        outcome: &mut ScheduleOutcome,
    ) {
        let mut remaining = requirement.required_hours;
        let mut past_horizon: Option<SyntheticDay> = None;

        while remaining > Decimal::ZERO {
            if !requirement.weekend.is_working_day(cursor.day) {
                cursor.advance();
                continue;
            }

            let hours = cursor.available().min(remaining);
            if past_horizon.is_none() && !cursor.day.within(self.config.horizon_days) {
                past_horizon = Some(cursor.day);
            }

            outcome.segments.push(ScheduledTaskSegment {
                resource_id: requirement.resource_id,
                resource_name: requirement.resource_name.clone(),
                item: requirement.item,
                item_name: requirement.item_name.clone(),
                start_day: cursor.day,
                duration_days: 1,
                segment_hours: hours,
                total_requirement_hours: requirement.required_hours,
                requirement_index: index,
            });

            remaining -= hours;
            cursor.consume(hours);
        }

        if let Some(day) = past_horizon {
            warn!(
                resource_id = requirement.resource_id,
                item = %requirement.item,
                day = day.get(),
                "requirement runs past the synthetic horizon"
            );
            outcome.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::W008BeyondHorizon,
                    format!(
                        "{} for resource {} runs past day {} (from day {})",
                        requirement.item,
                        requirement.resource_id,
                        self.config.horizon_days,
                        day.get()
                    ),
                )
                .with_subject(Subject::Requirement { index })
                .with_note("segments past the horizon are kept so no hours are lost"),
            );
        }
    }
}

impl Scheduler for DayScheduler {
    #[instrument(skip_all, fields(requirements = requirements.len()))]
    fn schedule(
        &self,
        requirements: &[TrainingRequirement],
    ) -> Result<ScheduleOutcome, ScheduleError> {
        self.config.validate()?;

        let mut outcome = ScheduleOutcome::default();

        for (resource_id, indices) in group_by_resource(requirements) {
            let mut cursor = ResourceCursor::new(self.config.daily_hour_ceiling);
            let mut ranks: HashMap<ItemRef, u32> = HashMap::new();
            let first_segment = outcome.segments.len();

            for index in indices {
                let requirement = &requirements[index];

                if requirement.required_hours <= Decimal::ZERO {
                    warn!(
                        resource_id,
                        item = %requirement.item,
                        hours = %requirement.required_hours,
                        "skipping requirement without positive hours"
                    );
                    outcome.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::W001NonPositiveHours,
                            format!(
                                "{} for resource {} has {} hours, nothing scheduled",
                                requirement.item, resource_id, requirement.required_hours
                            ),
                        )
                        .with_subject(Subject::Requirement { index }),
                    );
                    continue;
                }

                if requirement.required_hours > Decimal::from(MAX_REQUIREMENT_HOURS) {
                    warn!(
                        resource_id,
                        item = %requirement.item,
                        hours = %requirement.required_hours,
                        "skipping requirement above the hour cap"
                    );
                    outcome.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::W011ExcessiveHours,
                            format!(
                                "{} for resource {} has {} hours, more than {}, nothing scheduled",
                                requirement.item,
                                resource_id,
                                requirement.required_hours,
                                MAX_REQUIREMENT_HOURS
                            ),
                        )
                        .with_subject(Subject::Requirement { index }),
                    );
                    continue;
                }

                let rank = ranks.entry(requirement.item).or_insert(0);
                let offset = self.config.stagger.offset(resource_id, *rank);
                *rank += 1;

                cursor.start_no_earlier_than(SyntheticDay::FIRST.plus(offset));
                self.allocate(index, requirement, &mut cursor, &mut outcome);
            }

            debug!(
                resource_id,
                segments = outcome.segments.len() - first_segment,
                next_free_day = cursor.day.get(),
                "scheduled resource"
            );
        }

        Ok(outcome)
    }
}

/// Requirement indices per resource, each list ordered by item then input position
fn group_by_resource(requirements: &[TrainingRequirement]) -> BTreeMap<ResourceId, Vec<usize>> {
    let mut groups: BTreeMap<ResourceId, Vec<usize>> = BTreeMap::new();
    for (index, requirement) in requirements.iter().enumerate() {
        groups.entry(requirement.resource_id).or_default().push(index);
    }
    for indices in groups.values_mut() {
        // Stable: equal items keep input order
        indices.sort_by_key(|&i| requirements[i].item);
    }
    groups
}
