use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Weekday,
};

use crate::errors::AdvisorError;

/// Calendar trigger for a recurring job, evaluated in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Weekly { weekday: Weekday, time: NaiveTime },
    /// Days past the end of a short month fire on its last day.
    Monthly { day: u32, time: NaiveTime },
}

impl Schedule {
    /// Parses `"<weekday> HH:MM"`, e.g. `"sun 18:00"`.
    pub fn parse_weekly(input: &str) -> Result<Self, AdvisorError> {
        let (day, time) = split_day_time(input)?;
        let weekday = Weekday::from_str(day)
            .map_err(|_| AdvisorError::Config(format!("invalid weekday '{}'", day)))?;
        Ok(Self::Weekly { weekday, time })
    }

    /// Parses `"<day-of-month> HH:MM"`, e.g. `"1 09:00"`.
    pub fn parse_monthly(input: &str) -> Result<Self, AdvisorError> {
        let (day, time) = split_day_time(input)?;
        let day: u32 = day
            .parse()
            .map_err(|_| AdvisorError::Config(format!("invalid day of month '{}'", day)))?;
        if !(1..=31).contains(&day) {
            return Err(AdvisorError::Config(format!(
                "day of month must be within 1..=31, got {}",
                day
            )));
        }
        Ok(Self::Monthly { day, time })
    }

    /// First fire time strictly after `now`, in `now`'s offset.
    pub fn next_after(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let offset = *now.offset();
        let local = now.naive_local();

        let naive = match *self {
            Self::Weekly { weekday, time } => {
                let today = local.date();
                let ahead = (7 + weekday.num_days_from_monday()
                    - today.weekday().num_days_from_monday())
                    % 7;
                let candidate = (today + Duration::days(ahead as i64)).and_time(time);
                if candidate > local {
                    candidate
                } else {
                    candidate + Duration::weeks(1)
                }
            }
            Self::Monthly { day, time } => {
                let (year, month) = (local.year(), local.month());
                let candidate = monthly_fire(year, month, day, time);
                if candidate > local {
                    candidate
                } else {
                    let (year, month) = if month == 12 {
                        (year + 1, 1)
                    } else {
                        (year, month + 1)
                    };
                    monthly_fire(year, month, day, time)
                }
            }
        };

        let utc = naive - Duration::seconds(offset.local_minus_utc() as i64);
        DateTime::from_naive_utc_and_offset(utc, offset)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly { weekday, time } => {
                write!(f, "every {} at {}", weekday, time.format("%H:%M"))
            }
            Self::Monthly { day, time } => {
                write!(f, "day {} of each month at {}", day, time.format("%H:%M"))
            }
        }
    }
}

fn split_day_time(input: &str) -> Result<(&str, NaiveTime), AdvisorError> {
    let mut parts = input.split_whitespace();
    let (Some(day), Some(time), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AdvisorError::Config(format!(
            "schedule '{}' must look like '<day> HH:MM'",
            input
        )));
    };
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|e| AdvisorError::Config(format!("invalid time '{}': {}", time, e)))?;
    Ok((day, time))
}

fn monthly_fire(year: i32, month: u32, day: u32, time: NaiveTime) -> NaiveDateTime {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(NaiveDate::MIN)
        .and_time(time)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
