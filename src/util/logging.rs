use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Verbose,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Verbose => "debug",
        }
    }
}

/// Info line tagged with the calling component's `CC`.
#[macro_export]
macro_rules! logln {
    ($($arg:tt)+) => {
        ::tracing::info!(cc = Self::CC, $($arg)+)
    };
}

/// Debug line tagged with the calling component's `CC`.
#[macro_export]
macro_rules! logvbln {
    ($($arg:tt)+) => {
        ::tracing::debug!(cc = Self::CC, $($arg)+)
    };
}

/// Installs the process-wide subscriber. `RUST_LOG` wins over `level`.
/// Later calls are no-ops.
pub fn init(level: LogLevel) {
    SUBSCRIBER.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

        // Another subscriber may already be installed (tests); keep it.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
