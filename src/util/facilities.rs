use crate::{
    database::{progress_log::ProgressLogStore, BlobStore},
    errors::{ProgressError, Result},
    notify::Mailer,
    processors::{chart::Renderer, collector::ActivityCollector},
    util::config::Settings,
    App,
};

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum Required {
    Settings,
    BlobStore,
    Mailer,
    Renderer,
}

/// Wires the collaborators an `App` runs with. Every slot is required.
#[derive(Default)]
pub struct AppBuilder {
    settings: Option<Settings>,
    store: Option<Box<dyn BlobStore>>,
    mailer: Option<Box<dyn Mailer>>,
    renderer: Option<Box<dyn Renderer>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_store(mut self, store: impl BlobStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_boxed_store(mut self, store: Box<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_mailer(mut self, mailer: impl Mailer + 'static) -> Self {
        self.mailer = Some(Box::new(mailer));
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn missing(&self) -> Vec<Required> {
        let mut missing = Vec::new();
        if self.settings.is_none() {
            missing.push(Required::Settings);
        }
        if self.store.is_none() {
            missing.push(Required::BlobStore);
        }
        if self.mailer.is_none() {
            missing.push(Required::Mailer);
        }
        if self.renderer.is_none() {
            missing.push(Required::Renderer);
        }
        missing
    }

    pub fn build(self) -> Result<App> {
        match (self.settings, self.store, self.mailer, self.renderer) {
            (Some(settings), Some(store), Some(mailer), Some(renderer)) => Ok(App {
                collector: ActivityCollector::new(&settings),
                log_store: ProgressLogStore::new(store, &settings.key),
                mailer,
                renderer,
                settings,
            }),
            (settings, store, mailer, renderer) => {
                let missing = AppBuilder {
                    settings,
                    store,
                    mailer,
                    renderer,
                }
                .missing();
                Err(ProgressError::Config(format!("app is missing {:?}", missing)))
            }
        }
    }
}
