//! Scheduler configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::HORIZON_DAYS;
use crate::{ResourceId, ScheduleError};

/// Maximum hours any resource is scheduled for in one synthetic day
pub const DAILY_HOUR_CEILING: u32 = 8;

/// Largest requirement accepted: every day of the synthetic year at the ceiling
pub const MAX_REQUIREMENT_HOURS: u32 = DAILY_HOUR_CEILING * HORIZON_DAYS;

/// How the first day of each resource/item assignment is offset.
///
/// Without staggering every resource starts on day 1 and concurrent
/// assignments stack on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StaggerPolicy {
    /// Every assignment may start on day 1
    None,
    /// `offset = rank_step * rank + resource_step * (resource_id % resource_modulus)`
    Spread {
        rank_step: u32,
        resource_step: u32,
        resource_modulus: u64,
    },
}

impl Default for StaggerPolicy {
    fn default() -> Self {
        StaggerPolicy::Spread {
            rank_step: 2,
            resource_step: 2,
            resource_modulus: 5,
        }
    }
}

impl StaggerPolicy {
    /// Days to skip before the first allocation of an assignment.
    ///
    /// `rank` is the assignment's position among the resource's assignments of
    /// the same item.
    pub fn offset(&self, resource_id: ResourceId, rank: u32) -> u32 {
        match *self {
            StaggerPolicy::None => 0,
            StaggerPolicy::Spread {
                rank_step,
                resource_step,
                resource_modulus,
            } => {
                let bucket = resource_id.checked_rem(resource_modulus).unwrap_or(0);
                let bucket = u32::try_from(bucket).unwrap_or(u32::MAX);
                rank_step
                    .saturating_mul(rank)
                    .saturating_add(resource_step.saturating_mul(bucket))
            }
        }
    }
}

/// Settings shared by every stage of one computation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hour ceiling per resource per day, always [`DAILY_HOUR_CEILING`]
    pub daily_hour_ceiling: Decimal,
    /// Days past this are flagged but still scheduled
    pub horizon_days: u32,
    pub stagger: StaggerPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_hour_ceiling: Decimal::from(DAILY_HOUR_CEILING),
            horizon_days: HORIZON_DAYS,
            stagger: StaggerPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stagger(mut self, stagger: StaggerPolicy) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn daily_hour_ceiling(mut self, ceiling: impl Into<Decimal>) -> Self {
        self.daily_hour_ceiling = ceiling.into();
        self
    }

    pub fn horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Reject configurations no computation can run under.
    ///
    /// The ceiling is not tunable: anything other than [`DAILY_HOUR_CEILING`]
    /// hours is rejected.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.daily_hour_ceiling != Decimal::from(DAILY_HOUR_CEILING) {
            return Err(ScheduleError::InvalidHourCeiling(self.daily_hour_ceiling));
        }
        if self.horizon_days == 0 {
            return Err(ScheduleError::InvalidConfig(
                "horizon_days must be at least 1".into(),
            ));
        }
        if let StaggerPolicy::Spread {
            resource_modulus: 0,
            ..
        } = self.stagger
        {
            return Err(ScheduleError::InvalidConfig(
                "stagger resource_modulus must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_stagger_matches_spread_formula() {
        let policy = StaggerPolicy::default();
        assert_eq!(policy.offset(10, 0), 0);
        assert_eq!(policy.offset(7, 0), 4);
        assert_eq!(policy.offset(7, 1), 6);
        assert_eq!(policy.offset(4, 3), 14);
    }

    #[test]
    fn requirement_cap_is_one_full_year() {
        assert_eq!(MAX_REQUIREMENT_HOURS, 2880);
    }

    #[test]
    fn no_stagger_is_always_zero() {
        assert_eq!(StaggerPolicy::None.offset(123, 9), 0);
    }

    #[test]
    fn default_config_is_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.daily_hour_ceiling, dec!(8));
        assert_eq!(config.horizon_days, 360);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_ceiling_is_a_contract_violation() {
        let config = SchedulerConfig::new().daily_hour_ceiling(0);
        assert_eq!(
            config.validate(),
            Err(ScheduleError::InvalidHourCeiling(Decimal::ZERO))
        );
    }

    #[test]
    fn non_default_ceiling_is_a_contract_violation() {
        for ceiling in [dec!(12), dec!(7.5), dec!(-8)] {
            let config = SchedulerConfig::new().daily_hour_ceiling(ceiling);
            assert_eq!(
                config.validate(),
                Err(ScheduleError::InvalidHourCeiling(ceiling))
            );
        }
        // same value, different scale
        let config = SchedulerConfig::new().daily_hour_ceiling(dec!(8.00));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_modulus_is_rejected() {
        let config = SchedulerConfig::new().stagger(StaggerPolicy::Spread {
            rank_step: 2,
            resource_step: 2,
            resource_modulus: 0,
        });
        assert!(matches!(config.validate(), Err(ScheduleError::InvalidConfig(_))));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"stagger":{"mode":"none"}}"#).unwrap();
        assert_eq!(config.stagger, StaggerPolicy::None);
        assert_eq!(config.daily_hour_ceiling, dec!(8));
    }
}
