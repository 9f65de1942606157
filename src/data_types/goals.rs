use super::record::ActivityRecord;

/// The six metrics drawn on the progress chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cadence,
    Pace,
    Stride,
    HeartRate,
    Vo2Max,
    Bmi,
}

pub struct Goal {
    pub metric: Metric,
    pub target: f64,
}

/// Fixed targets, never mutated.
pub struct GoalSet {
    goals: [Goal; 6],
}

pub static GOALS: GoalSet = GoalSet {
    goals: [
        Goal { metric: Metric::Vo2Max, target: 60.0 },
        Goal { metric: Metric::Pace, target: 5.00 },
        Goal { metric: Metric::Bmi, target: 23.37 },
        Goal { metric: Metric::Cadence, target: 178.0 },
        Goal { metric: Metric::Stride, target: 1.20 },
        Goal { metric: Metric::HeartRate, target: 145.0 },
    ],
};

impl GoalSet {
    pub fn target(&self, metric: Metric) -> f64 {
        self.goals
            .iter()
            .find(|goal| goal.metric == metric)
            .map(|goal| goal.target)
            .unwrap_or_default()
    }
}

impl Metric {
    /// Chart panel order, top to bottom.
    pub const ALL: [Metric; 6] = [
        Metric::Cadence,
        Metric::Pace,
        Metric::Stride,
        Metric::HeartRate,
        Metric::Vo2Max,
        Metric::Bmi,
    ];

    /// Log column the metric is read from.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cadence => "Cadence (spm)",
            Metric::Pace => "Pace (min/km)",
            Metric::Stride => "Stride (m)",
            Metric::HeartRate => "Heart Rate (bpm)",
            Metric::Vo2Max => "VO2 Max",
            Metric::Bmi => "BMI",
        }
    }

    pub fn value(&self, record: &ActivityRecord) -> f64 {
        match self {
            Metric::Cadence => record.cadence_spm,
            Metric::Pace => record.pace_min_per_km,
            Metric::Stride => record.stride_m,
            Metric::HeartRate => record.heart_rate_bpm as f64,
            Metric::Vo2Max => record.vo2_max,
            Metric::Bmi => record.bmi,
        }
    }

    pub fn goal(&self) -> f64 {
        GOALS.target(*self)
    }

    // A lower pace is better, so its axis runs top-down.
    pub fn inverted_axis(&self) -> bool {
        *self == Metric::Pace
    }
}
