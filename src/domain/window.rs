//! Half-open export time windows

use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time range `[start, end)`; without `end` the window is open upwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Creates a window, rejecting an end that does not come after start
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let Some(end) = end {
            if end <= start {
                return Err(StrataError::Validation(format!(
                    "Window end {end} must be after start {start}"
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Window with only a lower bound
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// `[today - days, today)` at UTC day boundaries
    pub fn scheduled(frequency_in_days: u32, today: NaiveDate) -> Result<Self> {
        if frequency_in_days == 0 {
            return Err(StrataError::Validation(
                "frequency_in_days must be at least 1".to_string(),
            ));
        }
        let first_day = today
            .checked_sub_days(Days::new(u64::from(frequency_in_days)))
            .ok_or_else(|| {
                StrataError::Validation(format!(
                    "Cannot go back {frequency_in_days} days from {today}"
                ))
            })?;
        Self::new(day_start(first_day), Some(day_start(today)))
    }

    /// `[today, open)`
    pub fn today(today: NaiveDate) -> Self {
        Self::since(day_start(today))
    }

    /// `[from, to)`, open when `to` is absent
    pub fn manual(from: NaiveDate, to: Option<NaiveDate>) -> Result<Self> {
        Self::new(day_start(from), to.map(day_start))
    }

    /// Inclusive lower bound
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound; `None` when the window is open
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Half-open membership: start inclusive, end exclusive
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && self.end.map_or(true, |end| instant < end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.to_rfc3339_opts(SecondsFormat::Millis, true);
        match self.end {
            Some(end) => write!(
                f,
                "[{start}, {})",
                end.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            None => write!(f, "[{start}, open)"),
        }
    }
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// How the window of an export run is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// The `frequency_in_days` days before today
    Scheduled,
    /// Today so far, open-ended
    Today,
    /// Explicit dates, upper bound optional
    Manual {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

impl RunMode {
    /// Window for a run started on `today`
    pub fn window(&self, frequency_in_days: u32, today: NaiveDate) -> Result<TimeWindow> {
        match self {
            RunMode::Scheduled => TimeWindow::scheduled(frequency_in_days, today),
            RunMode::Today => Ok(TimeWindow::today(today)),
            RunMode::Manual { from, to } => TimeWindow::manual(*from, *to),
        }
    }
}
