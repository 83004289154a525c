//! Signal collaborators for the pulse-oximeter pipeline: a band-pass filter
//! adapter over the `biquad` IIR crate and a zero-cross beat detector.
//!
//! The pipeline core consumes both through the narrow [`SampleFilter`] and
//! [`BeatDetector`] traits, one stateful instance per recording session.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use thiserror::Error;

/// Stateful per-channel filter. One instance per channel, fed every sample
/// of that channel exactly once, in arrival order.
pub trait SampleFilter {
    fn filter(&mut self, value: f32) -> f32;
}

/// Stateful beat detector, fed `(timestamp, value)` pairs in strict
/// chronological order. Returns `true` when the sample is a beat.
pub trait BeatDetector {
    fn add_sample(&mut self, timestamp_ms: i64, value: f32) -> bool;
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter frequencies must be positive (fs={fs_hz}, f0={center_hz}, bw={bandwidth_hz})")]
    NonPositiveFrequency {
        fs_hz: f32,
        center_hz: f32,
        bandwidth_hz: f32,
    },
    #[error("band-pass coefficients rejected: {0:?}")]
    Coefficients(biquad::Errors),
}

/// Band-pass filter isolating the pulsatile component of a PPG channel.
///
/// `Q = center / bandwidth`, so the pass window is
/// `[center - bandwidth/2, center + bandwidth/2]`.
pub struct BandPass {
    inner: DirectForm2Transposed<f32>,
}

impl BandPass {
    pub fn new(
        sampling_rate_hz: f32,
        center_hz: f32,
        bandwidth_hz: f32,
    ) -> Result<Self, FilterError> {
        if sampling_rate_hz <= 0.0 || center_hz <= 0.0 || bandwidth_hz <= 0.0 {
            return Err(FilterError::NonPositiveFrequency {
                fs_hz: sampling_rate_hz,
                center_hz,
                bandwidth_hz,
            });
        }

        let coefficients = Coefficients::<f32>::from_params(
            Type::BandPass,
            sampling_rate_hz.hz(),
            center_hz.hz(),
            center_hz / bandwidth_hz,
        )
        .map_err(FilterError::Coefficients)?;

        Ok(Self {
            inner: DirectForm2Transposed::<f32>::new(coefficients),
        })
    }
}

impl SampleFilter for BandPass {
    fn filter(&mut self, value: f32) -> f32 {
        self.inner.run(value)
    }
}

#[derive(Copy, Clone)]
enum BeatRegion {
    Above,
    Below,
}

// A beat interval shorter than this would mean > 230 bpm, which is noise.
const MAX_BPM: i64 = 230;
const MIN_BEAT_INTERVAL_MS: i64 = 60_000 / MAX_BPM;

/// Hysteresis zero-cross detector for band-passed signals.
///
/// The band-passed PPG wave oscillates around zero; a beat is flagged on the
/// upward crossing, with a refractory interval so ringing near the threshold
/// cannot double-count a beat.
pub struct ZeroCrossDetector {
    region: BeatRegion,
    last_beat_ms: Option<i64>,
}

impl Default for ZeroCrossDetector {
    fn default() -> Self {
        Self {
            region: BeatRegion::Below,
            last_beat_ms: None,
        }
    }
}

impl BeatDetector for ZeroCrossDetector {
    fn add_sample(&mut self, timestamp_ms: i64, value: f32) -> bool {
        match (self.region, value > 0.0) {
            (BeatRegion::Above, false) => {
                self.region = BeatRegion::Below;
                false
            }
            (BeatRegion::Below, true) => {
                self.region = BeatRegion::Above;
                match self.last_beat_ms {
                    Some(last) if timestamp_ms - last < MIN_BEAT_INTERVAL_MS => false,
                    _ => {
                        self.last_beat_ms = Some(timestamp_ms);
                        true
                    }
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bandpass_rejects_bad_frequencies() {
        assert!(BandPass::new(0.0, 2.0, 3.0).is_err());
        assert!(BandPass::new(100.0, -2.0, 3.0).is_err());
        assert!(BandPass::new(100.0, 2.0, 0.0).is_err());
        // Center above Nyquist.
        assert!(BandPass::new(100.0, 80.0, 3.0).is_err());
        assert!(BandPass::new(100.0, 2.0, 3.0).is_ok());
    }

    #[test]
    fn bandpass_attenuates_dc() {
        let mut f = BandPass::new(100.0, 2.0, 3.0).unwrap();
        let mut last = 0.0;
        for _ in 0..2000 {
            last = f.filter(1000.0);
        }
        // A constant input is far outside the pass band.
        assert!(last.abs() < 1.0, "dc leak: {last}");
    }

    #[test]
    fn zero_cross_fires_once_per_upward_crossing() {
        let mut d = ZeroCrossDetector::default();
        let wave = [-1.0, -0.5, 0.5, 1.0, 0.5, -0.5, -1.0, 0.5, 1.0];
        let beats: Vec<i64> = wave
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| {
                let ts = i as i64 * 400;
                d.add_sample(ts, v).then_some(ts)
            })
            .collect();
        assert_eq!(beats, vec![800, 2800]);
    }

    #[test]
    fn zero_cross_refractory_suppresses_ringing() {
        let mut d = ZeroCrossDetector::default();
        assert!(d.add_sample(0, 1.0));
        assert!(!d.add_sample(40, -1.0));
        // Re-crossing 80 ms later would mean 750 bpm.
        assert!(!d.add_sample(80, 1.0));
        assert!(!d.add_sample(120, -1.0));
        // A plausible interval is accepted again.
        assert!(d.add_sample(600, 1.0));
    }
}
