use std::{io::ErrorKind, path::PathBuf};

use serde_derive::Deserialize;

use crate::errors::{ProgressError, Result};

use super::logging::LogLevel;

const CONFIG_PATH_ENV: &str = "PROGRESS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "progress.toml";

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    S3 { bucket: String },
    Local(PathBuf),
}

/// Runtime settings: an optional TOML file overlaid with environment variables.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    pub bucket: String,
    pub key: String,
    pub email_region: String,
    pub height_m: f64,
    pub vo2_max_placeholder: f64,

    // "s3" or "local:<dir>"
    pub storage: String,
    pub font_path: PathBuf,
    pub verbose: bool,

    #[serde(skip)]
    pub sender: Option<String>,
    #[serde(skip)]
    pub recipient: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket: "my-garmin-data-csv".to_string(),
            key: "weekly_collected_data.csv".to_string(),
            email_region: "eu-north-1".to_string(),
            height_m: 1.85,
            vo2_max_placeholder: 51.0,
            storage: "s3".to_string(),
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            verbose: false,
            sender: None,
            recipient: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                return Err(ProgressError::Config(format!("unable to read {}: {}", path, err)))
            }
        };

        Self::from_sources(file.as_deref(), |name| std::env::var(name).ok())
    }

    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings: Settings = match file {
            Some(content) => toml::from_str(content)
                .map_err(|err| ProgressError::Config(format!("invalid settings file: {}", err)))?,
            None => Settings::default(),
        };

        if let Some(bucket) = env("PROGRESS_BUCKET") {
            settings.bucket = bucket;
        }
        if let Some(key) = env("PROGRESS_KEY") {
            settings.key = key;
        }
        if let Some(region) = env("PROGRESS_EMAIL_REGION") {
            settings.email_region = region;
        }
        if let Some(storage) = env("PROGRESS_STORAGE") {
            settings.storage = storage;
        }
        if let Some(font) = env("PROGRESS_FONT") {
            settings.font_path = PathBuf::from(font);
        }

        settings.sender = env("EMAIL_SENDER");
        settings.recipient = env("EMAIL_RECIPIENT");

        if settings.height_m <= 0.0 {
            return Err(ProgressError::Config(format!(
                "height must be positive, got {}",
                settings.height_m
            )));
        }

        Ok(settings)
    }

    pub fn storage_backend(&self) -> Result<StorageBackend> {
        match self.storage.as_str() {
            "s3" => Ok(StorageBackend::S3 {
                bucket: self.bucket.clone(),
            }),
            other => match other.strip_prefix("local:") {
                Some(dir) if !dir.is_empty() => Ok(StorageBackend::Local(PathBuf::from(dir))),
                _ => Err(ProgressError::Config(format!("unknown storage backend '{}'", other))),
            },
        }
    }

    pub fn sender(&self) -> Result<&str> {
        self.sender
            .as_deref()
            .ok_or_else(|| ProgressError::Config("EMAIL_SENDER is not set".to_string()))
    }

    pub fn recipient(&self) -> Result<&str> {
        self.recipient
            .as_deref()
            .ok_or_else(|| ProgressError::Config("EMAIL_RECIPIENT is not set".to_string()))
    }

    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Info
        }
    }
}
