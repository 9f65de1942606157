use chrono::NaiveDate;
use serde_derive::{Deserialize, Serialize};

/// Header of the persisted progress log, in column order.
pub const COLUMNS: [&str; 12] = [
    "Date",
    "Distance (km)",
    "Total Time (min)",
    "Total Ascent (m)",
    "Max Altitude (m)",
    "Weight (kg)",
    "BMI",
    "VO2 Max",
    "Pace (min/km)",
    "Cadence (spm)",
    "Stride (m)",
    "Heart Rate (bpm)",
];

/// One row of the progress log. Field order matches `COLUMNS`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityRecord {
    #[serde(rename = "Date", with = "log_date")]
    pub date: NaiveDate,

    #[serde(rename = "Distance (km)")]
    pub distance_km: f64,

    #[serde(rename = "Total Time (min)")]
    pub total_time_min: f64,

    #[serde(rename = "Total Ascent (m)", deserialize_with = "whole_number")]
    pub total_ascent_m: i64,

    #[serde(rename = "Max Altitude (m)")]
    pub max_altitude_m: f64,

    #[serde(rename = "Weight (kg)")]
    pub weight_kg: f64,

    #[serde(rename = "BMI")]
    pub bmi: f64,

    #[serde(rename = "VO2 Max")]
    pub vo2_max: f64,

    #[serde(rename = "Pace (min/km)")]
    pub pace_min_per_km: f64,

    #[serde(rename = "Cadence (spm)")]
    pub cadence_spm: f64,

    #[serde(rename = "Stride (m)")]
    pub stride_m: f64,

    #[serde(rename = "Heart Rate (bpm)", deserialize_with = "whole_number")]
    pub heart_rate_bpm: i64,
}

// Older logs may carry integer columns written as floats ("140.0").
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <f64 as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.round() as i64)
}

pub(crate) mod log_date {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(text.trim()).ok_or_else(|| D::Error::custom(format!("invalid date '{}'", text)))
    }

    /// Accepts a bare date or a timestamp, keeping only the calendar day.
    pub fn parse(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, FORMAT)
            .or_else(|_| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
            })
            .or_else(|_| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date())
            })
            .ok()
    }
}
