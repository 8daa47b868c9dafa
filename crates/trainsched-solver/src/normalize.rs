//! Requirement Normalizer
//!
//! Turns the raw requirement rows of a plan into validated
//! [`TrainingRequirement`]s. Rows that cannot be scheduled are dropped and
//! reported; they never reach the scheduler as zero-length work.
//!
//! Row checks, in order:
//! 1. a resource id is present (W002)
//! 2. exactly one of machine / software is set (W004)
//! 3. hours are present and positive (W001), and no more than
//!    [`MAX_REQUIREMENT_HOURS`] (W011)
//! 4. the resource is in the catalog (W003)
//! 5. the item is in the catalog (W005)
//!
//! The weekend policy is the quote default unless the catalog item carries an
//! override, in which case the override wins.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use trainsched_core::{
    CatalogItem, Diagnostic, DiagnosticCode, ItemRef, PlanId, PlanSnapshot, QuoteSnapshot,
    RawRequirementRow, RawWeekendPolicy, Resource, ResourceId, ScheduleError, Subject,
    TrainingRequirement, WeekendPolicy, MAX_REQUIREMENT_HOURS,
};

/// Requirements of one plan, ready for scheduling
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedPlan {
    pub plan_id: PlanId,
    pub requirements: Vec<TrainingRequirement>,
    /// Raw row position each requirement came from
    pub source_rows: Vec<usize>,
    /// Rows dropped and why
    pub diagnostics: Vec<Diagnostic>,
}

impl NormalizedPlan {
    pub fn dropped_rows(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Validates raw rows against a quote's catalog
#[derive(Debug)]
pub struct RequirementNormalizer<'a> {
    resources: HashMap<ResourceId, &'a Resource>,
    items: HashMap<ItemRef, (&'a str, WeekendPolicy)>,
    quote_policy: WeekendPolicy,
}

impl<'a> RequirementNormalizer<'a> {
    /// Build a normalizer, resolving every weekend policy up front.
    ///
    /// A quote policy or item override with both flags undefined is a
    /// contract violation.
    pub fn new(
        resources: &'a [Resource],
        items: &'a [CatalogItem],
        quote_weekend: &RawWeekendPolicy,
    ) -> Result<Self, ScheduleError> {
        let quote_policy = quote_weekend.resolve("quote weekend policy")?;

        let mut resolved_items = HashMap::with_capacity(items.len());
        for entry in items {
            let policy = match &entry.weekend_override {
                Some(raw) => raw.resolve_over(quote_policy, &format!("{} override", entry.item))?,
                None => quote_policy,
            };
            resolved_items.insert(entry.item, (entry.name.as_str(), policy));
        }

        Ok(Self {
            resources: resources.iter().map(|r| (r.id, r)).collect(),
            items: resolved_items,
            quote_policy,
        })
    }

    /// Build a normalizer over a quote snapshot's catalog
    pub fn for_quote(quote: &'a QuoteSnapshot) -> Result<Self, ScheduleError> {
        Self::new(&quote.resources, &quote.items, &quote.weekend)
    }

    /// The resolved quote-level weekend policy
    pub fn quote_policy(&self) -> WeekendPolicy {
        self.quote_policy
    }

    /// Normalize every row of a plan
    #[instrument(skip_all, fields(plan_id = plan.id, rows = plan.rows.len()))]
    pub fn normalize(&self, plan: &PlanSnapshot) -> NormalizedPlan {
        let mut normalized = NormalizedPlan {
            plan_id: plan.id,
            ..Default::default()
        };

        for (row_index, row) in plan.rows.iter().enumerate() {
            let subject = Subject::Row {
                plan_id: plan.id,
                row: row_index,
            };
            match self.normalize_row(row) {
                Ok(requirement) => {
                    normalized.requirements.push(requirement);
                    normalized.source_rows.push(row_index);
                }
                Err(diagnostic) => {
                    warn!(
                        code = diagnostic.code.as_str(),
                        row = row_index,
                        "dropping requirement row: {}",
                        diagnostic.message
                    );
                    normalized.diagnostics.push(diagnostic.with_subject(subject));
                }
            }
        }

        debug!(
            kept = normalized.requirements.len(),
            dropped = normalized.dropped_rows(),
            "normalized plan"
        );
        normalized
    }

    fn normalize_row(&self, row: &RawRequirementRow) -> Result<TrainingRequirement, Diagnostic> {
        let Some(resource_id) = row.resource_id else {
            return Err(Diagnostic::new(
                DiagnosticCode::W002MissingResource,
                "requirement row has no resource",
            ));
        };

        let Some(item) = ItemRef::from_columns(row.machine_id, row.software_id) else {
            let message = if row.machine_id.is_some() {
                "requirement row names both a machine and a software item"
            } else {
                "requirement row names neither a machine nor a software item"
            };
            return Err(Diagnostic::new(DiagnosticCode::W004AmbiguousItem, message)
                .with_hint("set exactly one of machine_id / software_id"));
        };

        let hours = match row.hours {
            Some(hours) if hours > Decimal::from(MAX_REQUIREMENT_HOURS) => {
                return Err(Diagnostic::new(
                    DiagnosticCode::W011ExcessiveHours,
                    format!(
                        "{item} for resource {resource_id} has {hours} hours, more than {MAX_REQUIREMENT_HOURS}"
                    ),
                )
                .with_hint("check the hours column for a typo"));
            }
            Some(hours) if hours > Decimal::ZERO => hours,
            Some(hours) => {
                return Err(Diagnostic::new(
                    DiagnosticCode::W001NonPositiveHours,
                    format!("{item} for resource {resource_id} has {hours} hours"),
                ));
            }
            None => {
                return Err(Diagnostic::new(
                    DiagnosticCode::W001NonPositiveHours,
                    format!("{item} for resource {resource_id} has no hours"),
                ));
            }
        };

        let Some(resource) = self.resources.get(&resource_id) else {
            return Err(Diagnostic::new(
                DiagnosticCode::W003UnknownResource,
                format!("resource {resource_id} is not in the catalog"),
            ));
        };

        let Some(&(item_name, weekend)) = self.items.get(&item) else {
            return Err(Diagnostic::new(
                DiagnosticCode::W005UnknownItem,
                format!("{item} is not assigned to this quote"),
            ));
        };

        Ok(TrainingRequirement::new(resource_id, item)
            .resource_name(resource.name.as_str())
            .item_name(item_name)
            .hours(hours)
            .weekend(weekend))
    }
}
