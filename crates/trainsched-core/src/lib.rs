//! # trainsched-core
//!
//! Core domain model and contracts for the training scheduler and cost projector.
//!
//! This crate provides:
//! - Domain types: `TrainingRequirement`, `ScheduledTaskSegment`, `Resource`, `AreaCost`
//! - Cost results: `CostSummary`, `PlanCost`, `QuoteCost`
//! - The synthetic 12 x 30 day calendar (`calendar`)
//! - Data-quality diagnostics (`diagnostics`) and contract errors (`ScheduleError`)
//! - Raw, untrusted input rows as supplied by the catalog store (`snapshot`)
//! - The `Scheduler` trait
//!
//! ## Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use trainsched_core::{ItemRef, TrainingRequirement, WeekendPolicy};
//!
//! let requirement = TrainingRequirement::new(7, ItemRef::Machine(3))
//!     .resource_name("Alice")
//!     .item_name("Lathe X200")
//!     .hours(Decimal::from(20))
//!     .weekend(WeekendPolicy::weekdays_only());
//!
//! assert_eq!(requirement.item.kind(), "machine");
//! ```

pub mod calendar;
pub mod config;
pub mod diagnostics;
pub mod snapshot;

pub use calendar::{SyntheticDay, Weekday, DAYS_PER_MONTH, HORIZON_DAYS, MONTHS_PER_YEAR};
pub use config::{SchedulerConfig, StaggerPolicy, DAILY_HOUR_CEILING, MAX_REQUIREMENT_HOURS};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticEmitter, Severity, Subject};
pub use snapshot::{CatalogItem, PlanSnapshot, QuoteSnapshot, RawRequirementRow, RawWeekendPolicy};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a resource (a trainer or trainee)
pub type ResourceId = u64;

/// Identifier of a machine or software item in the catalog
pub type ItemId = u64;

/// Unique identifier for a training plan
pub type PlanId = u64;

/// Unique identifier for a quote
pub type QuoteId = u64;

/// Unique identifier for a geographic area
pub type AreaId = u64;

// ============================================================================
// Items
// ============================================================================

/// The item a requirement trains on: a machine or a software package.
///
/// Ordering is machines first, then software, each by id. The scheduler relies
/// on this ordering to lay out a resource's items deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Machine(ItemId),
    Software(ItemId),
}

impl ItemRef {
    /// Build from the two nullable item columns of a raw row.
    ///
    /// Returns `None` when both or neither column is set.
    pub fn from_columns(machine: Option<ItemId>, software: Option<ItemId>) -> Option<Self> {
        match (machine, software) {
            (Some(id), None) => Some(ItemRef::Machine(id)),
            (None, Some(id)) => Some(ItemRef::Software(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            ItemRef::Machine(id) | ItemRef::Software(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemRef::Machine(_) => "machine",
            ItemRef::Software(_) => "software",
        }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind(), self.id())
    }
}

// ============================================================================
// Weekend Policy
// ============================================================================

/// Resolved weekend-work policy for one requirement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekendPolicy {
    pub work_saturday: bool,
    pub work_sunday: bool,
}

impl WeekendPolicy {
    pub const fn new(work_saturday: bool, work_sunday: bool) -> Self {
        Self {
            work_saturday,
            work_sunday,
        }
    }

    /// Monday to Friday only
    pub const fn weekdays_only() -> Self {
        Self::new(false, false)
    }

    /// Every synthetic day is a working day
    pub const fn every_day() -> Self {
        Self::new(true, true)
    }

    /// Check if the given synthetic day is a working day under this policy
    pub fn is_working_day(&self, day: SyntheticDay) -> bool {
        match day.weekday() {
            Weekday::Saturday => self.work_saturday,
            Weekday::Sunday => self.work_sunday,
            _ => true,
        }
    }
}

// ============================================================================
// Requirement
// ============================================================================

/// One row of training demand, validated and strongly typed.
///
/// Immutable once handed to a scheduler. A single requirement is usually
/// decomposed into several day-bounded segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequirement {
    pub resource_id: ResourceId,
    /// Display name of the resource
    pub resource_name: String,
    pub item: ItemRef,
    /// Display name of the item
    pub item_name: String,
    /// Hours of training to schedule
    pub required_hours: Decimal,
    /// Weekend-work policy in effect for this requirement
    pub weekend: WeekendPolicy,
}

impl TrainingRequirement {
    /// Create a requirement with zero hours and the weekdays-only policy
    pub fn new(resource_id: ResourceId, item: ItemRef) -> Self {
        Self {
            resource_id,
            resource_name: format!("resource#{resource_id}"),
            item,
            item_name: item.to_string(),
            required_hours: Decimal::ZERO,
            weekend: WeekendPolicy::weekdays_only(),
        }
    }

    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = name.into();
        self
    }

    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    pub fn hours(mut self, hours: impl Into<Decimal>) -> Self {
        self.required_hours = hours.into();
        self
    }

    pub fn weekend(mut self, policy: WeekendPolicy) -> Self {
        self.weekend = policy;
        self
    }
}

// ============================================================================
// Schedule (Result)
// ============================================================================

/// A single day's worth of one requirement's work
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTaskSegment {
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub item: ItemRef,
    pub item_name: String,
    /// Day the segment occupies (1-based)
    pub start_day: SyntheticDay,
    /// Always 1: multi-day requirements produce one segment per day
    pub duration_days: u32,
    /// Hours worked on `start_day`, never above the daily ceiling
    pub segment_hours: Decimal,
    /// Hours of the originating requirement
    pub total_requirement_hours: Decimal,
    /// Index of the originating requirement in the scheduler's input slice
    pub requirement_index: usize,
}

impl ScheduledTaskSegment {
    /// Share of the originating requirement covered by this segment (0..=1)
    pub fn share(&self) -> Decimal {
        if self.total_requirement_hours.is_zero() {
            Decimal::ZERO
        } else {
            self.segment_hours / self.total_requirement_hours
        }
    }
}

/// Output of a scheduler run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Segments ordered by resource id, then by allocation order
    pub segments: Vec<ScheduledTaskSegment>,
    /// Data-quality conditions met while scheduling
    pub diagnostics: Vec<Diagnostic>,
}

impl ScheduleOutcome {
    /// Hours scheduled per day for one resource, across all its requirements
    pub fn daily_load(&self, resource_id: ResourceId) -> BTreeMap<SyntheticDay, Decimal> {
        let mut load = BTreeMap::new();
        for segment in self.segments.iter().filter(|s| s.resource_id == resource_id) {
            *load.entry(segment.start_day).or_insert(Decimal::ZERO) += segment.segment_hours;
        }
        load
    }

    /// Segments produced for the requirement at `requirement_index`
    pub fn segments_for(&self, requirement_index: usize) -> Vec<&ScheduledTaskSegment> {
        self.segments
            .iter()
            .filter(|s| s.requirement_index == requirement_index)
            .collect()
    }

    /// Total hours scheduled for the requirement at `requirement_index`
    pub fn scheduled_hours(&self, requirement_index: usize) -> Decimal {
        self.segments_for(requirement_index)
            .iter()
            .map(|s| s.segment_hours)
            .sum()
    }

    /// Distinct resources present in the schedule, ascending
    pub fn resources(&self) -> Vec<ResourceId> {
        let mut ids: Vec<_> = self.segments.iter().map(|s| s.resource_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Last day touched by any segment
    pub fn last_day(&self) -> Option<SyntheticDay> {
        self.segments.iter().map(|s| s.start_day).max()
    }
}

// ============================================================================
// Resource & Area Rates
// ============================================================================

/// A person receiving or delivering training, with its hourly rate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    /// Cost per training hour
    #[serde(default)]
    pub hourly_rate: Decimal,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            name: format!("resource#{id}"),
            hourly_rate: Decimal::ZERO,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn hourly_rate(mut self, rate: impl Into<Decimal>) -> Self {
        self.hourly_rate = rate.into();
        self
    }
}

/// Daily travel rates for one geographic area
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCost {
    pub id: AreaId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub accommodation_food: Decimal,
    #[serde(default)]
    pub allowance: Decimal,
    #[serde(default)]
    pub pocket_money: Decimal,
}

impl AreaCost {
    pub fn new(id: AreaId) -> Self {
        Self {
            id,
            name: format!("area#{id}"),
            accommodation_food: Decimal::ZERO,
            allowance: Decimal::ZERO,
            pocket_money: Decimal::ZERO,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the three daily rates at once
    pub fn rates(
        mut self,
        accommodation_food: impl Into<Decimal>,
        allowance: impl Into<Decimal>,
        pocket_money: impl Into<Decimal>,
    ) -> Self {
        self.accommodation_food = accommodation_food.into();
        self.allowance = allowance.into();
        self.pocket_money = pocket_money.into();
        self
    }

    /// Sum of the three daily rates
    pub fn daily_rate(&self) -> Decimal {
        self.accommodation_food + self.allowance + self.pocket_money
    }
}

// ============================================================================
// Cost Results
// ============================================================================

/// Trip window and cost figure for one resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub resource_id: ResourceId,
    pub resource_name: String,
    /// Sum of the resource's segment hours
    pub total_hours: Decimal,
    pub earliest_day: SyntheticDay,
    pub latest_day: SyntheticDay,
    /// ceil(total_hours / daily ceiling)
    pub training_days: u32,
    /// Training span plus one travel day on each side
    pub business_trip_days: u32,
    pub training_cost: Decimal,
    pub trip_cost: Decimal,
    /// False when the hourly rate was unknown or negative and `training_cost`
    /// fell back to 0
    pub training_cost_complete: bool,
    /// False when no area rate applied or a component was negative and
    /// `trip_cost` left it out
    pub trip_cost_complete: bool,
}

impl CostSummary {
    pub fn total_cost(&self) -> Decimal {
        self.training_cost + self.trip_cost
    }

    pub fn is_degraded(&self) -> bool {
        !(self.training_cost_complete && self.trip_cost_complete)
    }
}

/// Cost totals for one plan of a quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCost {
    pub plan_id: PlanId,
    /// Per-resource summaries, ascending by resource id
    pub summaries: Vec<CostSummary>,
    pub training_cost: Decimal,
    pub trip_cost: Decimal,
    /// True when any summary carries an incomplete cost
    pub degraded: bool,
}

impl PlanCost {
    pub fn from_summaries(plan_id: PlanId, summaries: Vec<CostSummary>) -> Self {
        let training_cost = summaries.iter().map(|s| s.training_cost).sum();
        let trip_cost = summaries.iter().map(|s| s.trip_cost).sum();
        let degraded = summaries.iter().any(CostSummary::is_degraded);
        Self {
            plan_id,
            summaries,
            training_cost,
            trip_cost,
            degraded,
        }
    }

    pub fn total_cost(&self) -> Decimal {
        self.training_cost + self.trip_cost
    }

    pub fn summary_for(&self, resource_id: ResourceId) -> Option<&CostSummary> {
        self.summaries.iter().find(|s| s.resource_id == resource_id)
    }
}

/// Cost totals across every plan of a quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCost {
    pub quote_id: QuoteId,
    pub plans: Vec<PlanCost>,
    pub training_cost: Decimal,
    pub trip_cost: Decimal,
    pub degraded: bool,
}

impl QuoteCost {
    pub fn from_plans(quote_id: QuoteId, plans: Vec<PlanCost>) -> Self {
        let training_cost = plans.iter().map(|p| p.training_cost).sum();
        let trip_cost = plans.iter().map(|p| p.trip_cost).sum();
        let degraded = plans.iter().any(|p| p.degraded);
        Self {
            quote_id,
            plans,
            training_cost,
            trip_cost,
            degraded,
        }
    }

    pub fn total_cost(&self) -> Decimal {
        self.training_cost + self.trip_cost
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Core scheduling abstraction
pub trait Scheduler: Send + Sync {
    /// Lay out the given requirements as day-bounded segments.
    ///
    /// Data-quality problems end up in `ScheduleOutcome::diagnostics`;
    /// only contract violations are returned as errors.
    fn schedule(&self, requirements: &[TrainingRequirement])
        -> Result<ScheduleOutcome, ScheduleError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Contract violation that stops a computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Daily hour ceiling must be 8, got {0}")]
    InvalidHourCeiling(Decimal),

    #[error("Malformed weekend policy for {context}: neither work_saturday nor work_sunday is set")]
    MalformedWeekendPolicy { context: String },

    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Tests
// ============================================================================
