//! # trainsched-solver
//!
//! Training scheduler and cost projector.
//!
//! This crate provides:
//! - Requirement normalization (raw catalog rows to typed requirements)
//! - Day-based scheduling under a shared per-resource daily hour ceiling
//! - Business-trip span and cost projection per resource
//! - A quote pipeline that runs all three for every plan, and a parallel batch
//!   entry point for many quotes
//!
//! Every stage is a pure function of its inputs. Data-quality problems are
//! returned as diagnostics; only contract violations are errors.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trainsched_core::{QuoteSnapshot, Scheduler, TrainingRequirement, ItemRef};
//! use trainsched_solver::{plan_quote, DayScheduler};
//!
//! // Single stage
//! let scheduler = DayScheduler::default();
//! let outcome = scheduler.schedule(&[
//!     TrainingRequirement::new(5, ItemRef::Machine(1)).hours(20),
//! ])?;
//!
//! // Whole pipeline
//! let report = plan_quote(&snapshot)?;
//! println!("total: {}", report.cost.total_cost());
//! ```

pub mod normalize;
pub mod planner;
pub mod projector;
pub mod scheduler;

pub use normalize::{NormalizedPlan, RequirementNormalizer};
pub use planner::{plan_quote, plan_quotes, PlanReport, QuotePlanner, QuoteReport};
pub use projector::{business_trip_days, AreaRate, CostProjector, Projection, TRAVEL_BUFFER_DAYS};
pub use scheduler::DayScheduler;
