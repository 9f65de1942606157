use std::{fmt::Display, time::Instant};

/// Logs how long a pipeline stage took when it goes out of scope.
pub struct Stopwatch {
    time: Instant,
    label: &'static str,
}

impl Stopwatch {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            time: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        self.label
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        tracing::debug!(stage = self.label, "finished in {}", self);
    }
}

impl Display for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.time.elapsed();

        if duration.as_secs() > 60 {
            write!(f, "{:0>2}:{:0>2}min", duration.as_secs() / 60, duration.as_secs() % 60)
        } else {
            write!(f, "{}ms", duration.as_millis())
        }
    }
}
