use serde::Serialize;

/// One filtered, archived PPG sample. Ordered and unique by `timestamp_ms`;
/// never mutated after insertion.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp_ms: i64,
    pub ir: f32,
    pub red: f32,
}

/// One heart-rate interval, derived from two consecutive beats.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct HeartRate {
    pub begin_ms: i64,
    pub end_ms: i64,
    pub bpm: f64,
}

impl HeartRate {
    /// `bpm = 60000 / (end - begin)`. A degenerate interval (`end <= begin`)
    /// yields no rate rather than an infinite or negative one.
    pub fn from_interval(begin_ms: i64, end_ms: i64) -> Option<Self> {
        if end_ms <= begin_ms {
            return None;
        }
        Some(Self {
            begin_ms,
            end_ms,
            bpm: 60_000.0 / (end_ms - begin_ms) as f64,
        })
    }
}

/// Absolute milliseconds to display-time units (seconds as a real number).
pub fn to_display_units(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

/// Inverse of [`to_display_units`], rounding to the nearest millisecond.
pub fn to_absolute_ms(display: f64) -> i64 {
    (display * 1000.0).round() as i64
}

/// A point in time in either unit, converted once at the query boundary.
#[derive(Copy, Clone, Debug)]
pub enum TimeRef {
    Millis(i64),
    Display(f64),
}

impl TimeRef {
    pub fn as_millis(self) -> i64 {
        match self {
            TimeRef::Millis(ms) => ms,
            TimeRef::Display(d) => to_absolute_ms(d),
        }
    }
}

/// The named series exposed to plot consumers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Series {
    Ir,
    Red,
    HeartRate,
}

impl Series {
    pub fn name(self) -> &'static str {
        match self {
            Series::Ir => "IR",
            Series::Red => "Red",
            Series::HeartRate => "Heart Rate",
        }
    }
}
