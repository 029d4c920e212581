//! Pure recurrence math: given a cadence and the date of the latest
//! occurrence, compute the next due date.
//!
//! Monthly and yearly cadences preserve the series anchor's day-of-month
//! where the target month allows it and clamp to the last valid day
//! otherwise, so a series anchored on the 31st survives February and lands
//! back on the 31st in longer months.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Cadence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for Cadence {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::SeriesConsistency(format!(
                "invalid cadence: {other}"
            ))),
        }
    }
}

/// Returns the due date following `after` for the given cadence.
///
/// `anchor` is the first due date of the series; only its day-of-month
/// matters, and only for monthly/yearly cadences.
pub fn next_occurrence(cadence: Cadence, after: NaiveDate, anchor: NaiveDate) -> NaiveDate {
    match cadence {
        Cadence::Daily => after.checked_add_days(Days::new(1)).unwrap_or(after),
        Cadence::Weekly => after.checked_add_days(Days::new(7)).unwrap_or(after),
        Cadence::Monthly => {
            let next = after.checked_add_months(Months::new(1)).unwrap_or(after);
            with_anchor_day(next, anchor.day())
        }
        Cadence::Yearly => {
            let next = after.checked_add_months(Months::new(12)).unwrap_or(after);
            with_anchor_day(next, anchor.day())
        }
    }
}

fn with_anchor_day(date: NaiveDate, anchor_day: u32) -> NaiveDate {
    let day = anchor_day.min(days_in_month(date.year(), date.month()));
    date.with_day(day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}
