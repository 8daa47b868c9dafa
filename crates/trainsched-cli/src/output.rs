//! Text and JSON rendering of quote reports

use std::io::{self, Write};

use rust_decimal::Decimal;
use serde::Serialize;
use trainsched_core::{CostSummary, PlanCost, QuoteCost, ScheduledTaskSegment};
use trainsched_solver::{PlanReport, QuoteReport};

/// Plans of a report selected for output
pub struct ReportView<'a> {
    pub report: &'a QuoteReport,
    pub plans: Vec<&'a PlanReport>,
    /// Quote totals are only meaningful when every plan is shown
    pub show_totals: bool,
}

impl<'a> ReportView<'a> {
    pub fn all(report: &'a QuoteReport) -> Self {
        Self {
            report,
            plans: report.plans.iter().collect(),
            show_totals: true,
        }
    }

    pub fn single(report: &'a QuoteReport, plan: &'a PlanReport) -> Self {
        Self {
            report,
            plans: vec![plan],
            show_totals: false,
        }
    }
}

// ============================================================================
// Text
// ============================================================================

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn degraded_mark(degraded: bool) -> &'static str {
    if degraded {
        " *"
    } else {
        ""
    }
}

fn write_header(w: &mut impl Write, view: &ReportView<'_>) -> io::Result<()> {
    writeln!(w, "Quote {}: {}", view.report.quote_id, view.report.quote_name)
}

fn write_segments(w: &mut impl Write, segments: &[ScheduledTaskSegment]) -> io::Result<()> {
    if segments.is_empty() {
        return writeln!(w, "  (no segments)");
    }
    writeln!(
        w,
        "  {:>4}  {:<8} {:<4} {:<16} {:<28} {:>7}",
        "Day", "Date", "Wkd", "Resource", "Item", "Hours"
    )?;
    for segment in segments {
        let item = format!("{} {}", segment.item, segment.item_name);
        writeln!(
            w,
            "  {:>4}  {:<8} {:<4} {:<16} {:<28} {:>7}",
            segment.start_day.get(),
            segment.start_day.to_string(),
            segment.start_day.weekday().as_str(),
            segment.resource_name,
            item.trim_end(),
            segment.segment_hours.to_string(),
        )?;
    }
    Ok(())
}

fn write_summary(w: &mut impl Write, summary: &CostSummary) -> io::Result<()> {
    writeln!(
        w,
        "  {:<16} {:>7} {:>5}-{:<5} {:>5} {:>5} {:>12} {:>12} {:>12}{}",
        summary.resource_name,
        summary.total_hours.to_string(),
        summary.earliest_day.get(),
        summary.latest_day.get(),
        summary.training_days,
        summary.business_trip_days,
        money(summary.training_cost),
        money(summary.trip_cost),
        money(summary.total_cost()),
        degraded_mark(summary.is_degraded()),
    )
}

fn write_plan_cost(w: &mut impl Write, cost: &PlanCost) -> io::Result<()> {
    writeln!(
        w,
        "  {:<16} {:>7} {:>11} {:>5} {:>5} {:>12} {:>12} {:>12}",
        "Resource", "Hours", "Days", "Train", "Trip", "Training", "Travel", "Total"
    )?;
    for summary in &cost.summaries {
        write_summary(w, summary)?;
    }
    writeln!(
        w,
        "  Plan total: training {}, trip {}, total {}{}",
        money(cost.training_cost),
        money(cost.trip_cost),
        money(cost.total_cost()),
        degraded_mark(cost.degraded),
    )
}

fn write_quote_total(w: &mut impl Write, cost: &QuoteCost) -> io::Result<()> {
    writeln!(
        w,
        "Quote total: training {}, trip {}, total {}{}",
        money(cost.training_cost),
        money(cost.trip_cost),
        money(cost.total_cost()),
        degraded_mark(cost.degraded),
    )?;
    if cost.degraded {
        writeln!(w, "* incomplete: a rate was missing or negative, see diagnostics")?;
    }
    Ok(())
}

/// Segment list followed by the cost breakdown, per plan
pub fn write_schedule_text(w: &mut impl Write, view: &ReportView<'_>) -> io::Result<()> {
    write_header(w, view)?;
    for plan in &view.plans {
        writeln!(w)?;
        writeln!(w, "Plan {}: {}", plan.plan_id, plan.plan_name)?;
        write_segments(w, &plan.schedule.segments)?;
        writeln!(w)?;
        write_plan_cost(w, &plan.cost)?;
    }
    if view.show_totals {
        writeln!(w)?;
        write_quote_total(w, &view.report.cost)?;
    }
    Ok(())
}

/// Cost breakdown only
pub fn write_cost_text(w: &mut impl Write, view: &ReportView<'_>) -> io::Result<()> {
    write_header(w, view)?;
    for plan in &view.plans {
        writeln!(w)?;
        writeln!(w, "Plan {}: {}", plan.plan_id, plan.plan_name)?;
        write_plan_cost(w, &plan.cost)?;
    }
    if view.show_totals {
        writeln!(w)?;
        write_quote_total(w, &view.report.cost)?;
    }
    Ok(())
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct ReportDocument<'a> {
    quote_id: u64,
    quote_name: &'a str,
    plans: Vec<PlanDocument<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<&'a QuoteCost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct PlanDocument<'a> {
    plan_id: u64,
    plan_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<&'a [ScheduledTaskSegment]>,
    cost: &'a PlanCost,
}

fn document<'a>(
    view: &ReportView<'a>,
    with_segments: bool,
    diagnostics: Option<serde_json::Value>,
) -> ReportDocument<'a> {
    ReportDocument {
        quote_id: view.report.quote_id,
        quote_name: &view.report.quote_name,
        plans: view
            .plans
            .iter()
            .map(|plan| PlanDocument {
                plan_id: plan.plan_id,
                plan_name: &plan.plan_name,
                segments: with_segments.then_some(plan.schedule.segments.as_slice()),
                cost: &plan.cost,
            })
            .collect(),
        total: view.show_totals.then_some(&view.report.cost),
        diagnostics,
    }
}

pub fn schedule_json(
    view: &ReportView<'_>,
    diagnostics: Option<serde_json::Value>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&document(view, true, diagnostics))
}

pub fn cost_json(
    view: &ReportView<'_>,
    diagnostics: Option<serde_json::Value>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&document(view, false, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainsched_core::{
        AreaCost, CatalogItem, ItemRef, PlanSnapshot, QuoteSnapshot, RawRequirementRow, Resource,
        SchedulerConfig, StaggerPolicy,
    };
    use trainsched_solver::plan_quote;

    fn report() -> QuoteReport {
        let mut quote = QuoteSnapshot::new(1, "Press line");
        quote.area_id = Some(1);
        quote.areas = vec![AreaCost::new(1).rates(100, 20, 10)];
        quote.resources = vec![Resource::new(1).name("Alice").hourly_rate(50)];
        quote.items = vec![CatalogItem::new(ItemRef::Machine(1), "Press")];
        quote.plans = vec![
            PlanSnapshot::new(1, "Operators").row(RawRequirementRow::machine(1, 1, 20)),
            PlanSnapshot::new(2, "Empty"),
        ];
        quote.scheduler = SchedulerConfig::new().stagger(StaggerPolicy::None);
        plan_quote(&quote).unwrap()
    }

    fn render(f: impl Fn(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn schedule_text_lists_segments_and_costs() {
        let report = report();
        let text = render(|w| write_schedule_text(w, &ReportView::all(&report)));

        assert!(text.starts_with("Quote 1: Press line"));
        assert!(text.contains("M01/D01  Mon"));
        assert!(text.contains("machine#1 Press"));
        assert!(text.contains("Plan total: training 1000.00, trip 650.00, total 1650.00"));
        assert!(text.contains("(no segments)"));
        assert!(text.contains("Quote total: training 1000.00, trip 650.00, total 1650.00"));
        assert!(!text.contains("incomplete"));
    }

    #[test]
    fn single_plan_view_has_no_quote_total() {
        let report = report();
        let view = ReportView::single(&report, &report.plans[0]);
        let text = render(|w| write_cost_text(w, &view));

        assert!(text.contains("Plan 1: Operators"));
        assert!(!text.contains("Plan 2"));
        assert!(!text.contains("Quote total"));
        assert!(!text.contains("M01/D01"));
    }

    #[test]
    fn schedule_json_shape() {
        let report = report();
        let json = schedule_json(&ReportView::all(&report), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["quote_id"], 1);
        assert_eq!(value["plans"][0]["segments"].as_array().unwrap().len(), 3);
        assert_eq!(value["plans"][0]["segments"][0]["start_day"], 1);
        assert!(value["total"].is_object());
        assert!(value.get("diagnostics").is_none());
    }

    #[test]
    fn cost_json_omits_segments() {
        let report = report();
        let diagnostics = serde_json::json!([]);
        let json = cost_json(&ReportView::all(&report), Some(diagnostics)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["plans"][0].get("segments").is_none());
        assert!(value["plans"][0]["cost"].is_object());
        assert!(value["diagnostics"].is_array());
    }
}
