use chrono::NaiveDate;

use crate::{
    data_types::{
        garmin::{BodyComposition, GarminActivity},
        record::ActivityRecord,
    },
    errors::{ProgressError, Result},
    garmin::FitnessAccount,
    logln, logvbln,
    util::{config::Settings, DateTimeUtils},
};

use super::round2;

/// Turns the latest activity and body-composition sample into a log row.
pub struct ActivityCollector {
    height_m: f64,
    vo2_max_placeholder: f64,
}

impl ActivityCollector {
    const CC: &'static str = "Collector";

    pub fn new(settings: &Settings) -> Self {
        Self {
            height_m: settings.height_m,
            vo2_max_placeholder: settings.vo2_max_placeholder,
        }
    }

    pub fn collect<A>(&self, account: &mut A, today: NaiveDate) -> Result<ActivityRecord>
    where
        A: FitnessAccount + ?Sized,
    {
        account.login()?;

        let activity = account
            .recent_activities(1)?
            .into_iter()
            .next()
            .ok_or_else(|| ProgressError::DataUnavailable("no recorded activities".to_string()))?;

        let (start, end) = DateTimeUtils::trailing_week(today);
        logvbln!("body composition from {} to {}", start, end);
        let body = account.body_composition(start, end)?;

        let record = self.derive_record(&activity, &body)?;
        logln!("latest activity on {}: {} km", record.date, record.distance_km);

        Ok(record)
    }

    pub fn derive_record(
        &self,
        activity: &GarminActivity,
        body: &BodyComposition,
    ) -> Result<ActivityRecord> {
        let start_time = activity
            .start_time_local
            .as_deref()
            .ok_or_else(|| missing("startTimeLocal"))?;

        let distance_km = round2(required(activity.distance, "distance")? / 1000.0);
        let total_time_min = round2(required(activity.duration, "duration")? / 60.0);

        let weight_g = body
            .date_weight_list
            .first()
            .and_then(|sample| sample.weight)
            .ok_or_else(|| {
                ProgressError::DataUnavailable("no weight sample in the last week".to_string())
            })?;
        let weight_kg = round2(weight_g / 1000.0);

        Ok(ActivityRecord {
            date: DateTimeUtils::start_date(start_time)?,
            distance_km,
            total_time_min,
            total_ascent_m: required(activity.elevation_gain, "elevationGain")?.round() as i64,
            max_altitude_m: round2(required(activity.max_elevation, "maxElevation")?),
            weight_kg,
            bmi: bmi(weight_kg, self.height_m),
            vo2_max: self.vo2_max_placeholder,
            pace_min_per_km: pace(total_time_min, distance_km)?,
            cadence_spm: round2(required(
                activity.average_running_cadence_in_steps_per_minute,
                "averageRunningCadenceInStepsPerMinute",
            )?),
            stride_m: round2(required(activity.avg_stride_length, "avgStrideLength")? / 100.0),
            // Passed through, not rounded: a fractional average is truncated.
            heart_rate_bpm: required(activity.average_hr, "averageHR")?.trunc() as i64,
        })
    }
}

pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    round2(weight_kg / (height_m * height_m))
}

/// Minutes per kilometer. Undefined for a zero-distance activity.
pub fn pace(total_time_min: f64, distance_km: f64) -> Result<f64> {
    if distance_km <= 0.0 {
        return Err(ProgressError::DataUnavailable(format!(
            "pace is undefined for a distance of {} km",
            distance_km
        )));
    }

    Ok(round2(total_time_min / distance_km))
}

fn required(value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ProgressError {
    ProgressError::DataUnavailable(format!("activity is missing '{}'", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::garmin::DateWeight;

    fn collector() -> ActivityCollector {
        ActivityCollector::new(&Settings::default())
    }

    fn activity() -> GarminActivity {
        GarminActivity {
            start_time_local: Some("2024-01-01 07:30:00".to_string()),
            distance: Some(10_000.0),
            duration: Some(3_000.0),
            elevation_gain: Some(100.0),
            max_elevation: Some(250.0),
            average_running_cadence_in_steps_per_minute: Some(170.0),
            avg_stride_length: Some(110.0),
            average_hr: Some(140.0),
        }
    }

    fn body(weight: Option<f64>) -> BodyComposition {
        BodyComposition {
            date_weight_list: vec![DateWeight { weight }],
        }
    }

    #[test]
    fn derives_reference_row() {
        let record = collector().derive_record(&activity(), &body(Some(80_000.0))).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(record.distance_km, 10.0);
        assert_eq!(record.total_time_min, 50.0);
        assert_eq!(record.total_ascent_m, 100);
        assert_eq!(record.max_altitude_m, 250.0);
        assert_eq!(record.weight_kg, 80.0);
        assert_eq!(record.bmi, 23.37);
        assert_eq!(record.vo2_max, 51.0);
        assert_eq!(record.pace_min_per_km, 5.0);
        assert_eq!(record.cadence_spm, 170.0);
        assert_eq!(record.stride_m, 1.1);
        assert_eq!(record.heart_rate_bpm, 140);
    }

    #[test]
    fn bmi_uses_height_squared() {
        assert_eq!(bmi(80.0, 1.85), 23.37);
        assert_eq!(bmi(72.5, 1.85), 21.18);
        assert_eq!(bmi(100.0, 2.0), 25.0);
    }

    #[test]
    fn pace_rounds_to_hundredths() {
        assert_eq!(pace(50.0, 10.0).unwrap(), 5.0);
        assert_eq!(pace(61.5, 12.34).unwrap(), 4.98);
    }

    #[test]
    fn heart_rate_is_not_rounded_up() {
        let mut run = activity();
        run.average_hr = Some(140.6);

        let record = collector().derive_record(&run, &body(Some(80_000.0))).unwrap();
        assert_eq!(record.heart_rate_bpm, 140);
    }

    #[test]
    fn zero_distance_has_no_pace() {
        assert!(matches!(pace(30.0, 0.0), Err(ProgressError::DataUnavailable(_))));

        let mut standing = activity();
        standing.distance = Some(0.0);
        assert!(collector().derive_record(&standing, &body(Some(80_000.0))).is_err());
    }

    #[test]
    fn missing_fields_are_unavailable() {
        let mut partial = activity();
        partial.avg_stride_length = None;

        let err = collector().derive_record(&partial, &body(Some(80_000.0))).unwrap_err();
        assert!(err.to_string().contains("avgStrideLength"));

        let err = collector()
            .derive_record(&activity(), &BodyComposition::default())
            .unwrap_err();
        assert!(matches!(err, ProgressError::DataUnavailable(_)));

        let err = collector().derive_record(&activity(), &body(None)).unwrap_err();
        assert!(matches!(err, ProgressError::DataUnavailable(_)));
    }
}
