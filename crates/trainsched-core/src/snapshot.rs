//! Raw input as handed over by the catalog store
//!
//! These types mirror the loosely typed rows of the external store: every
//! column may be missing. They are deserialized as-is and only become
//! [`TrainingRequirement`](crate::TrainingRequirement)s after the normalizer
//! has validated them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AreaCost, AreaId, ItemId, ItemRef, PlanId, QuoteId, Resource, ResourceId, ScheduleError,
    SchedulerConfig, WeekendPolicy,
};

/// Weekend flags as stored, each possibly undefined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeekendPolicy {
    pub work_saturday: Option<bool>,
    pub work_sunday: Option<bool>,
}

impl RawWeekendPolicy {
    pub const fn new(work_saturday: bool, work_sunday: bool) -> Self {
        Self {
            work_saturday: Some(work_saturday),
            work_sunday: Some(work_sunday),
        }
    }

    pub const fn is_undefined(&self) -> bool {
        self.work_saturday.is_none() && self.work_sunday.is_none()
    }

    /// Resolve a quote-level policy. A single missing flag means "no work".
    pub fn resolve(&self, context: &str) -> Result<WeekendPolicy, ScheduleError> {
        if self.is_undefined() {
            return Err(ScheduleError::MalformedWeekendPolicy {
                context: context.to_string(),
            });
        }
        Ok(WeekendPolicy::new(
            self.work_saturday.unwrap_or(false),
            self.work_sunday.unwrap_or(false),
        ))
    }

    /// Resolve an item-level override on top of the quote default.
    ///
    /// Flags the override defines win; missing ones fall back to `base`.
    pub fn resolve_over(
        &self,
        base: WeekendPolicy,
        context: &str,
    ) -> Result<WeekendPolicy, ScheduleError> {
        if self.is_undefined() {
            return Err(ScheduleError::MalformedWeekendPolicy {
                context: context.to_string(),
            });
        }
        Ok(WeekendPolicy::new(
            self.work_saturday.unwrap_or(base.work_saturday),
            self.work_sunday.unwrap_or(base.work_sunday),
        ))
    }
}

impl From<WeekendPolicy> for RawWeekendPolicy {
    fn from(policy: WeekendPolicy) -> Self {
        Self::new(policy.work_saturday, policy.work_sunday)
    }
}

/// One requirement row as stored
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequirementRow {
    pub resource_id: Option<ResourceId>,
    pub machine_id: Option<ItemId>,
    pub software_id: Option<ItemId>,
    pub hours: Option<Decimal>,
}

impl RawRequirementRow {
    pub fn machine(resource_id: ResourceId, machine_id: ItemId, hours: impl Into<Decimal>) -> Self {
        Self {
            resource_id: Some(resource_id),
            machine_id: Some(machine_id),
            software_id: None,
            hours: Some(hours.into()),
        }
    }

    pub fn software(
        resource_id: ResourceId,
        software_id: ItemId,
        hours: impl Into<Decimal>,
    ) -> Self {
        Self {
            resource_id: Some(resource_id),
            machine_id: None,
            software_id: Some(software_id),
            hours: Some(hours.into()),
        }
    }
}

/// A machine or software entry assigned to the quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item: ItemRef,
    #[serde(default)]
    pub name: String,
    /// Item-level weekend policy, wins over the quote default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_override: Option<RawWeekendPolicy>,
}

impl CatalogItem {
    pub fn new(item: ItemRef, name: impl Into<String>) -> Self {
        Self {
            item,
            name: name.into(),
            weekend_override: None,
        }
    }

    pub fn weekend_override(mut self, policy: RawWeekendPolicy) -> Self {
        self.weekend_override = Some(policy);
        self
    }
}

/// Requirement rows of one training plan
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub id: PlanId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rows: Vec<RawRequirementRow>,
}

impl PlanSnapshot {
    pub fn new(id: PlanId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, row: RawRequirementRow) -> Self {
        self.rows.push(row);
        self
    }
}

/// Point-in-time snapshot of everything one quote computation reads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub id: QuoteId,
    #[serde(default)]
    pub name: String,
    /// Geographic area selected on the quote
    #[serde(default)]
    pub area_id: Option<AreaId>,
    /// Quote-level weekend policy
    #[serde(default)]
    pub weekend: RawWeekendPolicy,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub areas: Vec<AreaCost>,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub plans: Vec<PlanSnapshot>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl QuoteSnapshot {
    pub fn new(id: QuoteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            weekend: RawWeekendPolicy::new(false, false),
            ..Default::default()
        }
    }

    pub fn area(&self) -> Option<&AreaCost> {
        let id = self.area_id?;
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn item(&self, item: ItemRef) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.item == item)
    }

    pub fn plan(&self, id: PlanId) -> Option<&PlanSnapshot> {
        self.plans.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn undefined_quote_policy_is_malformed() {
        let raw = RawWeekendPolicy::default();
        assert!(matches!(
            raw.resolve("quote 1"),
            Err(ScheduleError::MalformedWeekendPolicy { .. })
        ));
    }

    #[test]
    fn partial_quote_policy_defaults_to_no_work() {
        let raw = RawWeekendPolicy {
            work_saturday: Some(true),
            work_sunday: None,
        };
        assert_eq!(raw.resolve("quote 1").unwrap(), WeekendPolicy::new(true, false));
    }

    #[test]
    fn override_falls_back_per_flag() {
        let base = WeekendPolicy::new(true, false);
        let raw = RawWeekendPolicy {
            work_saturday: None,
            work_sunday: Some(true),
        };
        assert_eq!(
            raw.resolve_over(base, "machine#1").unwrap(),
            WeekendPolicy::every_day()
        );
    }

    #[test]
    fn rows_deserialize_with_missing_columns() {
        let row: RawRequirementRow =
            serde_json::from_str(r#"{"resource_id": 3, "machine_id": 9, "hours": 12.5}"#).unwrap();
        assert_eq!(row.resource_id, Some(3));
        assert_eq!(row.software_id, None);
        assert_eq!(row.hours, Some(dec!(12.5)));

        let empty: RawRequirementRow = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, RawRequirementRow::default());
    }

    #[test]
    fn snapshot_lookups() {
        let mut quote = QuoteSnapshot::new(1, "Q");
        quote.area_id = Some(2);
        quote.areas = vec![AreaCost::new(1), AreaCost::new(2).rates(dec!(90), dec!(5), dec!(5))];
        quote.resources = vec![Resource::new(7).hourly_rate(dec!(40))];
        quote.items = vec![CatalogItem::new(ItemRef::Software(3), "CAD")];
        quote.plans = vec![PlanSnapshot::new(11, "Onboarding")];

        assert_eq!(quote.area().map(AreaCost::daily_rate), Some(dec!(100)));
        assert_eq!(quote.resource(7).map(|r| r.hourly_rate), Some(dec!(40)));
        assert_eq!(quote.item(ItemRef::Software(3)).map(|i| i.name.as_str()), Some("CAD"));
        assert!(quote.item(ItemRef::Machine(3)).is_none());
        assert_eq!(quote.plan(11).map(|p| p.name.as_str()), Some("Onboarding"));
    }
}
