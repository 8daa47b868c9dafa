//! Quote pipeline: normalize, schedule and project every plan of a quote.
//!
//! Plans are independent and run in parallel. Nothing is shared between
//! invocations except the read-only snapshot.

use rayon::prelude::*;
use tracing::{info, instrument};
use trainsched_core::{
    Diagnostic, DiagnosticCode, PlanCost, PlanId, PlanSnapshot, QuoteCost, QuoteId,
    QuoteSnapshot, ScheduleError, ScheduleOutcome, Scheduler, SchedulerConfig, Severity, Subject,
    TrainingRequirement,
};

use crate::normalize::RequirementNormalizer;
use crate::projector::{AreaRate, CostProjector};
use crate::scheduler::DayScheduler;

/// Everything computed for one plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanReport {
    pub plan_id: PlanId,
    pub plan_name: String,
    /// Scheduler input, as produced by the normalizer
    pub requirements: Vec<TrainingRequirement>,
    pub schedule: ScheduleOutcome,
    pub cost: PlanCost,
    /// Diagnostics of every stage, in pipeline order
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanReport {
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Warning)
    }
}

/// Everything computed for one quote
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteReport {
    pub quote_id: QuoteId,
    pub quote_name: String,
    pub plans: Vec<PlanReport>,
    pub cost: QuoteCost,
}

impl QuoteReport {
    pub fn plan(&self, plan_id: PlanId) -> Option<&PlanReport> {
        self.plans.iter().find(|p| p.plan_id == plan_id)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.plans.iter().flat_map(|p| p.diagnostics.iter())
    }

    /// True when some cost in the quote could not be fully priced
    pub fn is_degraded(&self) -> bool {
        self.cost.degraded
    }
}

/// Runs the normalize / schedule / project pipeline
#[derive(Clone, Debug, Default)]
pub struct QuotePlanner {
    config: SchedulerConfig,
}

impl QuotePlanner {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Plan every plan of the quote
    #[instrument(skip_all, fields(quote_id = quote.id, plans = quote.plans.len()))]
    pub fn plan_quote(&self, quote: &QuoteSnapshot) -> Result<QuoteReport, ScheduleError> {
        self.config.validate()?;
        let normalizer = RequirementNormalizer::for_quote(quote)?;
        let scheduler = DayScheduler::new(self.config.clone());
        let projector = CostProjector::new(&self.config)?;
        let area = AreaRate::resolve(quote.area_id, &quote.areas);

        let plans: Vec<PlanReport> = quote
            .plans
            .par_iter()
            .map(|plan| run_plan(plan, quote, &normalizer, &scheduler, &projector, area))
            .collect::<Result<_, _>>()?;

        let cost = QuoteCost::from_plans(quote.id, plans.iter().map(|p| p.cost.clone()).collect());
        info!(
            quote_id = quote.id,
            total = %cost.total_cost(),
            degraded = cost.degraded,
            "quote planned"
        );

        Ok(QuoteReport {
            quote_id: quote.id,
            quote_name: quote.name.clone(),
            plans,
            cost,
        })
    }
}

fn run_plan(
    plan: &PlanSnapshot,
    quote: &QuoteSnapshot,
    normalizer: &RequirementNormalizer<'_>,
    scheduler: &DayScheduler,
    projector: &CostProjector,
    area: AreaRate<'_>,
) -> Result<PlanReport, ScheduleError> {
    let normalized = normalizer.normalize(plan);
    let schedule = scheduler.schedule(&normalized.requirements)?;
    let projection = projector.project(plan.id, &schedule.segments, &quote.resources, area);

    let mut diagnostics = normalized.diagnostics;
    diagnostics.extend(schedule.diagnostics.iter().cloned());
    diagnostics.extend(projection.diagnostics);
    diagnostics.push(plan_summary(plan, &normalized.requirements, &schedule));

    Ok(PlanReport {
        plan_id: plan.id,
        plan_name: plan.name.clone(),
        requirements: normalized.requirements,
        schedule,
        cost: projection.cost,
        diagnostics,
    })
}

fn plan_summary(
    plan: &PlanSnapshot,
    requirements: &[TrainingRequirement],
    schedule: &ScheduleOutcome,
) -> Diagnostic {
    let last_day = schedule
        .last_day()
        .map_or_else(|| "-".to_string(), |d| d.get().to_string());
    Diagnostic::new(
        DiagnosticCode::I001PlanScheduled,
        format!(
            "plan {} scheduled: {} requirements, {} segments, last day {}",
            plan.id,
            requirements.len(),
            schedule.segments.len(),
            last_day
        ),
    )
    .with_subject(Subject::Plan { id: plan.id })
}

/// Plan a quote with the scheduler settings it carries
pub fn plan_quote(quote: &QuoteSnapshot) -> Result<QuoteReport, ScheduleError> {
    QuotePlanner::new(quote.scheduler.clone()).plan_quote(quote)
}

/// Plan many quotes concurrently. Results keep the input order.
pub fn plan_quotes(quotes: &[QuoteSnapshot]) -> Vec<Result<QuoteReport, ScheduleError>> {
    quotes.par_iter().map(plan_quote).collect()
}
