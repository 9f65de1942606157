use chrono::{Days, NaiveDate};

use crate::{
    data_types::record::log_date,
    errors::{ProgressError, Result},
};

pub mod config;
pub mod facilities;
pub mod logging;
pub(crate) mod time;

pub struct DateTimeUtils {}

impl DateTimeUtils {
    /// Calendar day of a Connect `startTimeLocal` ("2024-01-01 07:30:00").
    pub fn start_date(start_time_local: &str) -> Result<NaiveDate> {
        let day = start_time_local.split(' ').next().unwrap_or_default();

        log_date::parse(day).ok_or_else(|| {
            ProgressError::DataUnavailable(format!(
                "unreadable activity start time '{}'",
                start_time_local
            ))
        })
    }

    /// The seven days leading up to and including `today`.
    pub fn trailing_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today.checked_sub_days(Days::new(7)).unwrap_or(today);
        (start, today)
    }

    pub fn to_str(date: NaiveDate) -> String {
        date.format(log_date::FORMAT).to_string()
    }
}
