#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use garmin_progress::{
    data_types::garmin::{BodyComposition, DateWeight, GarminActivity},
    database::{progress_log::ProgressLog, BlobStore},
    errors::{ProgressError, Result},
    garmin::FitnessAccount,
    notify::Mailer,
    processors::chart::Renderer,
    util::{config::Settings, facilities::AppBuilder},
    App,
};

pub const KEY: &str = "weekly_collected_data.csv";

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub puts: Arc<Mutex<usize>>,
    pub unreachable: bool,
}

impl MemoryStore {
    pub fn with_blob(key: &str, body: Vec<u8>) -> Self {
        let store = Self::default();
        store.blobs.lock().unwrap().insert(key.to_string(), body);
        store
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn log(&self) -> ProgressLog {
        ProgressLog::from_csv(&self.blob(KEY).unwrap_or_default()).unwrap()
    }

    pub fn put_count(&self) -> usize {
        *self.puts.lock().unwrap()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.unreachable {
            return Err(ProgressError::Storage("connection refused".to_string()));
        }
        Ok(self.blob(key))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        if self.unreachable {
            return Err(ProgressError::Storage("connection refused".to_string()));
        }
        *self.puts.lock().unwrap() += 1;
        self.blobs.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<(String, String, Vec<u8>)>>>,
    pub reject: bool,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_raw(&self, sender: &str, recipient: &str, raw: Vec<u8>) -> Result<()> {
        if self.reject {
            return Err(ProgressError::Notify("MessageRejected: address not verified".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((sender.to_string(), recipient.to_string(), raw));
        Ok(())
    }
}

/// Records the row count of every log it is asked to draw.
#[derive(Clone, Default)]
pub struct FakeRenderer {
    pub rendered: Arc<Mutex<Vec<usize>>>,
}

impl Renderer for FakeRenderer {
    fn render(&self, log: &ProgressLog) -> Result<Vec<u8>> {
        self.rendered.lock().unwrap().push(log.len());
        Ok(b"\x89PNG\r\n\x1a\nchart".to_vec())
    }
}

pub struct FakeAccount {
    pub activities: Vec<GarminActivity>,
    pub body: BodyComposition,
    pub accept_login: bool,
    pub logins: usize,
    pub body_window: Option<(NaiveDate, NaiveDate)>,
}

impl FakeAccount {
    pub fn with_activity_on(start_time_local: &str) -> Self {
        Self {
            activities: vec![GarminActivity {
                start_time_local: Some(start_time_local.to_string()),
                distance: Some(10_000.0),
                duration: Some(3_000.0),
                elevation_gain: Some(100.0),
                max_elevation: Some(250.0),
                average_running_cadence_in_steps_per_minute: Some(170.0),
                avg_stride_length: Some(110.0),
                average_hr: Some(140.0),
            }],
            body: BodyComposition {
                date_weight_list: vec![DateWeight {
                    weight: Some(80_000.0),
                }],
            },
            accept_login: true,
            logins: 0,
            body_window: None,
        }
    }
}

impl FitnessAccount for FakeAccount {
    fn login(&mut self) -> Result<()> {
        self.logins += 1;
        if self.accept_login {
            Ok(())
        } else {
            Err(ProgressError::Auth("invalid sign in".to_string()))
        }
    }

    fn recent_activities(&mut self, count: usize) -> Result<Vec<GarminActivity>> {
        Ok(self.activities.iter().take(count).cloned().collect())
    }

    fn body_composition(&mut self, start: NaiveDate, end: NaiveDate) -> Result<BodyComposition> {
        self.body_window = Some((start, end));
        Ok(self.body.clone())
    }
}

pub fn settings() -> Settings {
    Settings {
        sender: Some("me@example.com".to_string()),
        recipient: Some("you@example.com".to_string()),
        ..Settings::default()
    }
}

pub fn app(store: &MemoryStore, mailer: &RecordingMailer, renderer: &FakeRenderer) -> App {
    app_with(settings(), store, mailer, renderer)
}

pub fn app_with(
    settings: Settings,
    store: &MemoryStore,
    mailer: &RecordingMailer,
    renderer: &FakeRenderer,
) -> App {
    AppBuilder::new()
        .with_settings(settings)
        .with_store(store.clone())
        .with_mailer(mailer.clone())
        .with_renderer(renderer.clone())
        .build()
        .ok()
        .unwrap()
}

pub fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}
