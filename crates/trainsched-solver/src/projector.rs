//! Trip & Cost Projector
//!
//! Collapses each resource's segments into one business trip and a cost figure.
//!
//! Per resource:
//! - `training_days      = ceil(total_hours / ceiling)`
//! - `business_trip_days = (latest + 1) - (earliest - 1) + 1`
//! - `training_cost      = hourly_rate * total_hours`
//! - `trip_cost          = area daily rate * business_trip_days`
//!
//! `training_days` comes from hours, not from the number of days touched,
//! because weekends can leave gaps between segments.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};
use trainsched_core::{
    AreaCost, AreaId, CostSummary, Diagnostic, DiagnosticCode, PlanCost, PlanId, Resource,
    ResourceId, ScheduleError, ScheduledTaskSegment, SchedulerConfig, Subject,
};

/// Travel days added around the training span, one on each side
pub const TRAVEL_BUFFER_DAYS: u32 = 2;

/// The area rate a quote resolves to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaRate<'a> {
    Selected(&'a AreaCost),
    /// The quote has no area
    NotSelected,
    /// The quote's area has no rate row
    Unknown(AreaId),
}

impl<'a> AreaRate<'a> {
    pub fn resolve(area_id: Option<AreaId>, areas: &'a [AreaCost]) -> Self {
        match area_id {
            None => AreaRate::NotSelected,
            Some(id) => areas
                .iter()
                .find(|a| a.id == id)
                .map_or(AreaRate::Unknown(id), AreaRate::Selected),
        }
    }

    fn diagnostic(&self, plan_id: PlanId) -> Option<Diagnostic> {
        match self {
            AreaRate::Selected(_) => None,
            AreaRate::NotSelected => Some(
                Diagnostic::new(
                    DiagnosticCode::W006NoAreaSelected,
                    format!("plan {plan_id}: quote has no geographic area, trip cost is incomplete"),
                )
                .with_subject(Subject::Area { id: None })
                .with_hint("select an area on the quote to price travel"),
            ),
            AreaRate::Unknown(id) => Some(
                Diagnostic::new(
                    DiagnosticCode::W007UnknownArea,
                    format!("plan {plan_id}: area {id} has no daily rates, trip cost is incomplete"),
                )
                .with_subject(Subject::Area { id: Some(*id) }),
            ),
        }
    }
}

/// Costs of one plan plus what went wrong computing them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub cost: PlanCost,
    pub diagnostics: Vec<Diagnostic>,
}

/// Derives per-resource trip spans and costs from a schedule
#[derive(Clone, Debug)]
pub struct CostProjector {
    ceiling: Decimal,
}

impl CostProjector {
    pub fn new(config: &SchedulerConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self {
            ceiling: config.daily_hour_ceiling,
        })
    }

    /// Project costs for the segments of one plan
    #[instrument(skip_all, fields(plan_id = plan_id, segments = segments.len()))]
    pub fn project(
        &self,
        plan_id: PlanId,
        segments: &[ScheduledTaskSegment],
        resources: &[Resource],
        area: AreaRate<'_>,
    ) -> Projection {
        let mut diagnostics = Vec::new();
        let groups = group_segments(segments);

        if groups.is_empty() {
            return Projection {
                cost: PlanCost::from_summaries(plan_id, Vec::new()),
                diagnostics,
            };
        }

        let daily_rate = match area {
            AreaRate::Selected(area) => non_negative_daily_rate(area, &mut diagnostics),
            _ => {
                let diagnostic = area.diagnostic(plan_id);
                if let Some(diagnostic) = &diagnostic {
                    warn!(code = diagnostic.code.as_str(), "{}", diagnostic.message);
                }
                PricedRate::from_diagnostics(Decimal::ZERO, diagnostic, &mut diagnostics)
            }
        };

        let rates: HashMap<ResourceId, &Resource> = resources.iter().map(|r| (r.id, r)).collect();
        let mut summaries = Vec::with_capacity(groups.len());

        for (resource_id, group) in groups {
            let hourly_rate = match rates.get(&resource_id) {
                Some(resource) if resource.hourly_rate < Decimal::ZERO => {
                    warn!(resource_id, rate = %resource.hourly_rate, "negative hourly rate");
                    let diagnostic = Diagnostic::new(
                        DiagnosticCode::W009NegativeRate,
                        format!(
                            "resource {resource_id} has a negative hourly rate ({}), training cost is incomplete",
                            resource.hourly_rate
                        ),
                    )
                    .with_subject(Subject::Resource { id: resource_id });
                    PricedRate::from_diagnostics(Decimal::ZERO, Some(diagnostic), &mut diagnostics)
                }
                Some(resource) => PricedRate::complete(resource.hourly_rate),
                None => {
                    warn!(resource_id, "no hourly rate for scheduled resource");
                    let diagnostic = Diagnostic::new(
                        DiagnosticCode::W010MissingHourlyRate,
                        format!("resource {resource_id} has no hourly rate, training cost is incomplete"),
                    )
                    .with_subject(Subject::Resource { id: resource_id });
                    PricedRate::from_diagnostics(Decimal::ZERO, Some(diagnostic), &mut diagnostics)
                }
            };

            let summary = self.summarize(resource_id, &group, hourly_rate, daily_rate);
            debug!(
                resource_id,
                training_days = summary.training_days,
                business_trip_days = summary.business_trip_days,
                "projected resource"
            );
            summaries.push(summary);
        }

        Projection {
            cost: PlanCost::from_summaries(plan_id, summaries),
            diagnostics,
        }
    }

    /// Cost summary for one resource's (non-empty) segment group
    fn summarize(
        &self,
        resource_id: ResourceId,
        group: &[&ScheduledTaskSegment],
        hourly_rate: PricedRate,
        daily_rate: PricedRate,
    ) -> CostSummary {
        let total_hours: Decimal = group.iter().map(|s| s.segment_hours).sum();
        let earliest_day = group.iter().map(|s| s.start_day).min().unwrap_or_default();
        let latest_day = group.iter().map(|s| s.start_day).max().unwrap_or_default();

        let business_trip_days = business_trip_days(earliest_day.get(), latest_day.get());
        let training_days = self.training_days(total_hours);

        CostSummary {
            resource_id,
            resource_name: group
                .first()
                .map(|s| s.resource_name.clone())
                .unwrap_or_default(),
            total_hours,
            earliest_day,
            latest_day,
            training_days,
            business_trip_days,
            training_cost: hourly_rate.amount * total_hours,
            trip_cost: daily_rate.amount * Decimal::from(business_trip_days),
            training_cost_complete: hourly_rate.complete,
            trip_cost_complete: daily_rate.complete,
        }
    }

    /// `ceil(total_hours / ceiling)`
    pub fn training_days(&self, total_hours: Decimal) -> u32 {
        (total_hours / self.ceiling)
            .ceil()
            .to_u32()
            .unwrap_or(u32::MAX)
    }
}

/// Training span from `earliest` to `latest` plus one travel day on each side
pub fn business_trip_days(earliest: u32, latest: u32) -> u32 {
    latest.saturating_sub(earliest) + 1 + TRAVEL_BUFFER_DAYS
}

fn group_segments(
    segments: &[ScheduledTaskSegment],
) -> BTreeMap<ResourceId, Vec<&ScheduledTaskSegment>> {
    let mut groups: BTreeMap<ResourceId, Vec<&ScheduledTaskSegment>> = BTreeMap::new();
    for segment in segments {
        groups.entry(segment.resource_id).or_default().push(segment);
    }
    groups
}

/// A rate as priced, and whether nothing had to be substituted for it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PricedRate {
    amount: Decimal,
    complete: bool,
}

impl PricedRate {
    fn complete(amount: Decimal) -> Self {
        Self {
            amount,
            complete: true,
        }
    }

    /// The rate is incomplete as soon as one of its diagnostics degrades cost
    fn from_diagnostics(
        amount: Decimal,
        found: impl IntoIterator<Item = Diagnostic>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut complete = true;
        for diagnostic in found {
            complete &= !diagnostic.code.degrades_cost();
            diagnostics.push(diagnostic);
        }
        Self { amount, complete }
    }
}

/// Area daily rate with negative components left out
fn non_negative_daily_rate(area: &AreaCost, diagnostics: &mut Vec<Diagnostic>) -> PricedRate {
    let components = [
        ("accommodation_food", area.accommodation_food),
        ("allowance", area.allowance),
        ("pocket_money", area.pocket_money),
    ];
    let mut total = Decimal::ZERO;
    let mut found = Vec::new();
    for (name, rate) in components {
        if rate < Decimal::ZERO {
            warn!(area_id = area.id, component = name, rate = %rate, "negative area rate");
            found.push(
                Diagnostic::new(
                    DiagnosticCode::W009NegativeRate,
                    format!(
                        "area {} has a negative {name} rate ({rate}), trip cost is incomplete",
                        area.id
                    ),
                )
                .with_subject(Subject::Area { id: Some(area.id) }),
            );
        } else {
            total += rate;
        }
    }
    PricedRate::from_diagnostics(total, found, diagnostics)
}
