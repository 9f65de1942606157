use chrono::NaiveDate;

use crate::{
    data_types::record::{ActivityRecord, COLUMNS},
    errors::{ProgressError, Result},
    logln, logvbln,
};

use super::BlobStore;

/// Append-only table of weekly activity records, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressLog {
    records: Vec<ActivityRecord>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|record| record.date)
    }

    /// Appends `record` unless the last row already carries its date.
    /// Only the final row is compared; earlier dates are not checked.
    pub fn append_if_new(&mut self, record: ActivityRecord) -> bool {
        if self.last_date() == Some(record.date) {
            return false;
        }

        self.records.push(record);
        true
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }

        Ok(Self { records })
    }

    /// The header row is always written, even for an empty log.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(COLUMNS).map_err(write_err)?;
        for record in &self.records {
            writer.serialize(record).map_err(write_err)?;
        }

        writer
            .into_inner()
            .map_err(|err| ProgressError::Storage(format!("flushing progress log: {}", err)))
    }
}

// Read failures stay `Malformed`; failing to write is a storage problem.
fn write_err(err: csv::Error) -> ProgressError {
    ProgressError::Storage(format!("writing progress log: {}", err))
}

/// Loads and persists the progress log as one CSV blob.
pub struct ProgressLogStore {
    store: Box<dyn BlobStore>,
    key: String,
}

impl ProgressLogStore {
    const CC: &'static str = "ProgressLog";

    pub fn new(store: Box<dyn BlobStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// An absent blob yields an empty log.
    pub async fn load(&self) -> Result<ProgressLog> {
        match self.store.get(&self.key).await? {
            Some(bytes) => {
                let log = ProgressLog::from_csv(&bytes)?;
                logvbln!("loaded {} rows from {}", log.len(), self.key);
                Ok(log)
            }
            None => {
                logln!("{} not found, starting an empty log", self.key);
                Ok(ProgressLog::new())
            }
        }
    }

    /// Full overwrite, last writer wins.
    pub async fn persist(&self, log: &ProgressLog) -> Result<()> {
        let body = log.to_csv()?;
        self.store.put(&self.key, body).await?;
        logln!("persisted {} rows to {}", log.len(), self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, distance_km: f64) -> ActivityRecord {
        ActivityRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            distance_km,
            total_time_min: 50.0,
            total_ascent_m: 100,
            max_altitude_m: 250.0,
            weight_kg: 80.0,
            bmi: 23.37,
            vo2_max: 51.0,
            pace_min_per_km: 5.0,
            cadence_spm: 170.0,
            stride_m: 1.1,
            heart_rate_bpm: 140,
        }
    }

    #[test]
    fn appends_to_empty_log() {
        let mut log = ProgressLog::new();
        assert!(log.append_if_new(record("2024-01-01", 10.0)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn skips_same_date_as_last_row() {
        let mut log = ProgressLog::from_records(vec![record("2024-01-01", 10.0)]);
        let before = log.clone();

        assert!(!log.append_if_new(record("2024-01-01", 12.0)));
        assert!(!log.append_if_new(record("2024-01-01", 12.0)));
        assert_eq!(log, before);
    }

    #[test]
    fn only_last_row_is_compared() {
        let mut log = ProgressLog::from_records(vec![
            record("2024-01-01", 10.0),
            record("2024-01-08", 11.0),
        ]);

        assert!(log.append_if_new(record("2024-01-01", 9.0)));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn empty_log_writes_header_only() {
        let text = String::from_utf8(ProgressLog::new().to_csv().unwrap()).unwrap();
        assert_eq!(text, format!("{}\n", COLUMNS.join(",")));

        let parsed = ProgressLog::from_csv(text.as_bytes()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn csv_round_trip_keeps_cells() {
        let log = ProgressLog::from_records(vec![
            record("2024-01-01", 10.0),
            record("2024-01-08", 12.34),
        ]);

        let bytes = log.to_csv().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("2024-01-01,10.0,50.0,100,250.0,80.0,23.37,51.0,5.0,170.0,1.1,140"));

        assert_eq!(ProgressLog::from_csv(&bytes).unwrap(), log);
    }

    #[test]
    fn reads_logs_with_timestamps_and_float_integers() {
        let text = format!(
            "{}\n2024-01-01 00:00:00,10.0,50.0,100.0,250.0,80.0,23.37,51.0,5.0,170.0,1.1,140.0\n",
            COLUMNS.join(",")
        );

        let log = ProgressLog::from_csv(text.as_bytes()).unwrap();
        assert_eq!(log.records(), &[record("2024-01-01", 10.0)]);
    }

    #[test]
    fn write_failures_are_storage_errors() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(["a", "b"]).unwrap();
        let csv_err = writer.write_record(["only one"]).unwrap_err();

        let err = write_err(csv_err);
        assert!(matches!(err, ProgressError::Storage(_)));
        assert!(err.to_string().contains("writing progress log"));
    }

    #[test]
    fn missing_column_is_malformed() {
        let text = "Date,Distance (km)\n2024-01-01,10.0\n";
        assert!(matches!(
            ProgressLog::from_csv(text.as_bytes()),
            Err(ProgressError::Malformed(_))
        ));
    }
}
