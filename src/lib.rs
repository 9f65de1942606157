use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use serde_derive::Serialize;

use database::{
    local::LocalStore,
    progress_log::{ProgressLog, ProgressLogStore},
    s3::S3Store,
    BlobStore,
};
use errors::{ProgressError, Result};
use garmin::{api::GarminApi, FitnessAccount};
use notify::{ses::SesMailer, Greeting, Mailer, ProgressEmail};
use processors::{
    chart::{ChartRenderer, Renderer},
    collector::ActivityCollector,
};
use util::{
    config::{Settings, StorageBackend},
    facilities::AppBuilder,
    logging,
    time::Stopwatch,
    DateTimeUtils,
};

pub mod data_types;
pub mod database;
pub mod errors;
pub mod garmin;
pub mod notify;
pub mod processors;
pub mod util;

/// Result reported back to whatever triggered a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Outcome {
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn failure(unit: &str, err: &ProgressError) -> Self {
        tracing::error!(unit, kind = err.kind(), "{}", err);

        Self {
            status_code: 500,
            body: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

pub struct App {
    settings: Settings,
    collector: ActivityCollector,
    log_store: ProgressLogStore,
    mailer: Box<dyn Mailer>,
    renderer: Box<dyn Renderer>,
}

impl App {
    const CC: &'static str = "App";

    /// Production wiring: storage per `Settings::storage`, SES for email.
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let store: Box<dyn BlobStore> = match settings.storage_backend()? {
            StorageBackend::S3 { bucket } => Box::new(S3Store::from_env(&bucket).await),
            StorageBackend::Local(dir) => Box::new(LocalStore::new(dir)),
        };
        let mailer = SesMailer::from_env(&settings.email_region).await;
        let renderer = ChartRenderer::new(&settings);

        AppBuilder::new()
            .with_boxed_store(store)
            .with_mailer(mailer)
            .with_renderer(renderer)
            .with_settings(settings)
            .build()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch, append, persist, chart and email. Any failure becomes a 500 outcome;
    /// a row persisted before a later failure stays persisted.
    pub async fn run_collector<A>(&self, account: &mut A, today: NaiveDate) -> Outcome
    where
        A: FitnessAccount + ?Sized,
    {
        match self.collect_and_notify(account, today).await {
            Ok(date) => Outcome::success(format!(
                "Data updated & emailed for {}",
                DateTimeUtils::to_str(date)
            )),
            Err(err) => Outcome::failure("collector", &err),
        }
    }

    /// Chart and email the stored log as it is.
    pub async fn run_notifier(&self) -> Outcome {
        match self.load_and_notify().await {
            Ok(()) => Outcome::success("Weekly progress email sent!"),
            Err(err) => Outcome::failure("notifier", &err),
        }
    }

    async fn collect_and_notify<A>(&self, account: &mut A, today: NaiveDate) -> Result<NaiveDate>
    where
        A: FitnessAccount + ?Sized,
    {
        self.check_addresses()?;

        let record = {
            let _watch = Stopwatch::start("collect");
            self.collector.collect(account, today)?
        };
        let date = record.date;

        let mut log = self.log_store.load().await?;
        if log.append_if_new(record) {
            self.log_store.persist(&log).await?;
        } else {
            logln!("{} is already the latest row, log left unchanged", date);
        }

        self.send_chart(&log, Greeting::Update).await?;
        Ok(date)
    }

    async fn load_and_notify(&self) -> Result<()> {
        self.check_addresses()?;

        let log = self.log_store.load().await?;
        self.send_chart(&log, Greeting::Weekly).await
    }

    async fn send_chart(&self, log: &ProgressLog, greeting: Greeting) -> Result<()> {
        let png = {
            let _watch = Stopwatch::start("render");
            self.renderer.render(log)?
        };

        let sender = self.settings.sender()?;
        let recipient = self.settings.recipient()?;
        let raw = ProgressEmail::compose(sender, recipient, greeting, png)?;

        let _watch = Stopwatch::start("notify");
        self.mailer.send_raw(sender, recipient, raw).await?;
        logln!("progress chart for {} rows sent to {}", log.len(), recipient);

        Ok(())
    }

    fn check_addresses(&self) -> Result<()> {
        self.settings.sender()?;
        self.settings.recipient()?;
        Ok(())
    }
}

async fn app_from_env() -> Result<App> {
    let settings = Settings::load();
    logging::init(settings.as_ref().map(Settings::log_level).unwrap_or_default());
    App::from_settings(settings?).await
}

/// Entry point of the `collector` binary.
pub async fn collector_handler() -> Outcome {
    let app = match app_from_env().await {
        Ok(app) => app,
        Err(err) => return Outcome::failure("collector", &err),
    };
    let mut account = match GarminApi::from_env() {
        Ok(account) => account,
        Err(err) => return Outcome::failure("collector", &err),
    };

    app.run_collector(&mut account, Local::now().date_naive()).await
}

/// Entry point of the `notifier` binary.
pub async fn notifier_handler() -> Outcome {
    match app_from_env().await {
        Ok(app) => app.run_notifier().await,
        Err(err) => Outcome::failure("notifier", &err),
    }
}
