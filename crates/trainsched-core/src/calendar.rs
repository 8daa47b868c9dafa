//! Synthetic scheduling calendar
//!
//! Scheduling does not happen on a real calendar. The domain is a fixed grid of
//! 12 months of 30 days each (360 days), 1-indexed:
//!
//! - `month        = ((day - 1) / 30) + 1`
//! - `day_of_month = ((day - 1) % 30) + 1`
//!
//! The weekday is derived from the unbroken day number: `day % 7 == 6` is a
//! Saturday, `day % 7 == 0` a Sunday, so day 1 is a Monday. Because 30 is not a
//! multiple of 7, the weekday of a given `day_of_month` shifts from one month
//! to the next.

use serde::{Deserialize, Serialize};

/// Days in every synthetic month
pub const DAYS_PER_MONTH: u32 = 30;

/// Months in the synthetic year
pub const MONTHS_PER_YEAR: u32 = 12;

/// Last day of the synthetic calendar
pub const HORIZON_DAYS: u32 = DAYS_PER_MONTH * MONTHS_PER_YEAR;

/// A 1-based day offset into the synthetic calendar.
///
/// Serialized as a bare number; deserializing goes through [`SyntheticDay::new`]
/// so day 0 never exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct SyntheticDay(u32);

impl SyntheticDay {
    pub const FIRST: Self = Self(1);

    /// Day numbers are 1-based; 0 is clamped to 1.
    pub const fn new(day: u32) -> Self {
        if day == 0 {
            Self(1)
        } else {
            Self(day)
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The following day
    pub const fn succ(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The day `days` after this one
    pub const fn plus(self, days: u32) -> Self {
        Self(self.0.saturating_add(days))
    }

    /// 1-based synthetic month. Days past the horizon keep counting (13, 14, ...).
    pub const fn month(self) -> u32 {
        self.0.saturating_sub(1) / DAYS_PER_MONTH + 1
    }

    /// 1-based day within the synthetic month (1..=30)
    pub const fn day_of_month(self) -> u32 {
        self.0.saturating_sub(1) % DAYS_PER_MONTH + 1
    }

    pub const fn weekday(self) -> Weekday {
        Weekday::from_day_number(self.0)
    }

    pub const fn is_weekend(self) -> bool {
        self.weekday().is_weekend()
    }

    /// Check if the day lies within a horizon of `horizon_days`
    pub const fn within(self, horizon_days: u32) -> bool {
        self.0 <= horizon_days
    }
}

impl Default for SyntheticDay {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for SyntheticDay {
    fn from(day: u32) -> Self {
        Self::new(day)
    }
}

impl From<SyntheticDay> for u32 {
    fn from(day: SyntheticDay) -> Self {
        day.0
    }
}

impl std::fmt::Display for SyntheticDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "M{:02}/D{:02}", self.month(), self.day_of_month())
    }
}

/// Day of the week in the synthetic calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Weekday of an absolute day number (`day % 7`, 1 = Monday, 0 = Sunday)
    pub const fn from_day_number(day: u32) -> Self {
        match day % 7 {
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            6 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }

    pub const fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
