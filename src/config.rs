use serde::Deserialize;

use crate::types::Series;

/// Which channel (and polarity) feeds the beat detector. The band-passed IR
/// wave dips on a beat, so the default inverts it before detection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatChannel {
    Ir,
    Red,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Device sampling rate, used to derive the band-pass coefficients.
    pub sampling_rate_hz: f32,
    /// Center of the pass band. Resting pulse sits around 1-2 Hz.
    pub band_center_hz: f32,
    /// Width of the pass band; Q = center / width.
    pub band_width_hz: f32,
    /// Trailing window of raw rates feeding each smoothed rate.
    pub quantile_window: usize,
    /// Fraction trimmed from each end of the sorted window.
    pub trim_fraction: f64,
    pub beat_channel: BeatChannel,
    pub invert_beat_signal: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 100.0,
            band_center_hz: 2.0,
            band_width_hz: 3.0,
            quantile_window: 10,
            trim_fraction: 0.3,
            beat_channel: BeatChannel::Ir,
            invert_beat_signal: true,
        }
    }
}

/// Per-series display toggles consulted by the min/max scaling query.
#[derive(Copy, Clone, Debug)]
pub struct SeriesFlags {
    pub ir: bool,
    pub red: bool,
    pub heart_rate: bool,
}

impl Default for SeriesFlags {
    fn default() -> Self {
        Self {
            ir: true,
            red: true,
            heart_rate: true,
        }
    }
}

impl SeriesFlags {
    pub fn set(&mut self, series: Series, enabled: bool) {
        match series {
            Series::Ir => self.ir = enabled,
            Series::Red => self.red = enabled,
            Series::HeartRate => self.heart_rate = enabled,
        }
    }

    pub fn get(&self, series: Series) -> bool {
        match series {
            Series::Ir => self.ir,
            Series::Red => self.red,
            Series::HeartRate => self.heart_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_json_with_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"sampling_rate_hz": 50.0, "beat_channel": "red"}"#).unwrap();
        assert_eq!(cfg.sampling_rate_hz, 50.0);
        assert_eq!(cfg.beat_channel, BeatChannel::Red);
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.quantile_window, 10);
        assert_eq!(cfg.trim_fraction, 0.3);
    }

    #[test]
    fn flags_toggle_by_series() {
        let mut flags = SeriesFlags::default();
        assert!(flags.get(Series::Red));
        flags.set(Series::Red, false);
        assert!(!flags.get(Series::Red));
        assert!(flags.get(Series::Ir));
    }
}
