use beatdet::{BandPass, BeatDetector, SampleFilter, ZeroCrossDetector};
use chrono::Utc;

use crate::archive::SampleArchive;
use crate::batch::RawRecord;
use crate::config::{BeatChannel, PipelineConfig, SeriesFlags};
use crate::error::ConfigError;
use crate::smooth::QuantileSmoother;
use crate::types::{to_display_units, HeartRate, Sample, Series, TimeRef};

/// What one `ingest` call added, for the caller to react to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub new_samples: usize,
    pub new_beats: usize,
    pub new_rates: usize,
}

/// One recording session: the archive, beat stream and rate sequences, the
/// per-channel filters and the beat detector, all behind a single writer.
///
/// Collaborators are injected at construction and replaced wholesale on
/// [`reset`](Pipeline::reset); the pipeline never reaches for globals.
/// `ingest` runs synchronously to completion, so readers between calls always
/// observe a fully settled state.
pub struct Pipeline<F, D> {
    config: PipelineConfig,
    series: SeriesFlags,
    ir_filter: F,
    red_filter: F,
    detector: D,
    archive: SampleArchive,
    beats: Vec<i64>,
    raw: Vec<HeartRate>,
    smoothed: Vec<HeartRate>,
    smoother: QuantileSmoother,
    beg_ms: Option<i64>,
    dirty: bool,
}

impl Pipeline<BandPass, ZeroCrossDetector> {
    /// Builds the default collaborators from the configuration. Filter
    /// misconfiguration surfaces here, once, not per sample.
    pub fn from_config(config: PipelineConfig) -> Result<Self, ConfigError> {
        let ir = BandPass::new(
            config.sampling_rate_hz,
            config.band_center_hz,
            config.band_width_hz,
        )?;
        let red = BandPass::new(
            config.sampling_rate_hz,
            config.band_center_hz,
            config.band_width_hz,
        )?;
        Ok(Self::new(config, ir, red, ZeroCrossDetector::default()))
    }
}

impl<F: SampleFilter, D: BeatDetector> Pipeline<F, D> {
    pub fn new(config: PipelineConfig, ir_filter: F, red_filter: F, detector: D) -> Self {
        let smoother = QuantileSmoother::new(config.quantile_window, config.trim_fraction);
        Self {
            config,
            series: SeriesFlags::default(),
            ir_filter,
            red_filter,
            detector,
            archive: SampleArchive::default(),
            beats: Vec::new(),
            raw: Vec::new(),
            smoothed: Vec::new(),
            smoother,
            beg_ms: None,
            dirty: false,
        }
    }

    /// Processes one batch against the current wall clock.
    pub fn ingest(&mut self, batch: &[RawRecord]) -> ProcessingSummary {
        self.ingest_at(batch, Utc::now().timestamp_millis())
    }

    /// Processes one batch, using `now_ms` to anchor the first batch's
    /// device-relative timestamps to the epoch. Batches may overlap or arrive
    /// out of order; only entries newer than the previous high-water mark are
    /// scanned for beats, so re-ingesting old data changes nothing.
    pub fn ingest_at(&mut self, batch: &[RawRecord], now_ms: i64) -> ProcessingSummary {
        let mut summary = ProcessingSummary::default();
        if batch.is_empty() {
            return summary;
        }

        let beg_ms = *self.beg_ms.get_or_insert_with(|| {
            let max_device_ms = batch.iter().map(|r| r.device_ms).max().unwrap_or(0);
            let beg = now_ms - max_device_ms as i64;
            log::info!("archive base time set to {beg} ms");
            beg
        });

        let previous_last_ms = self.archive.last_ms();

        for record in batch {
            let sample = Sample {
                timestamp_ms: beg_ms + record.device_ms as i64,
                ir: self.ir_filter.filter(record.ir as f32),
                red: self.red_filter.filter(record.red as f32),
            };
            if self.archive.insert(sample) {
                summary.new_samples += 1;
            }
        }

        let scan_from = match previous_last_ms {
            Some(ms) => self.archive.index_later_than(ms),
            None => 0,
        };
        summary.new_beats = self.scan_for_beats(scan_from);
        summary.new_rates = self.smoother.extend(&self.raw, &mut self.smoothed);

        if summary != ProcessingSummary::default() {
            self.dirty = true;
        }
        log::debug!(
            "batch of {}: {} new samples, {} beats, {} rates",
            batch.len(),
            summary.new_samples,
            summary.new_beats,
            summary.new_rates
        );
        summary
    }

    fn scan_for_beats(&mut self, scan_from: usize) -> usize {
        let sign = if self.config.invert_beat_signal {
            -1.0
        } else {
            1.0
        };
        let mut new_beats = 0;
        for i in scan_from..self.archive.len() {
            let sample = self.archive.samples()[i];
            let value = match self.config.beat_channel {
                BeatChannel::Ir => sample.ir,
                BeatChannel::Red => sample.red,
            };
            if !self.detector.add_sample(sample.timestamp_ms, sign * value) {
                continue;
            }
            if let Some(&last_beat) = self.beats.last() {
                if let Some(rate) = HeartRate::from_interval(last_beat, sample.timestamp_ms) {
                    self.raw.push(rate);
                }
            }
            self.beats.push(sample.timestamp_ms);
            new_beats += 1;
        }
        new_beats
    }

    /// Clears everything and installs fresh collaborator instances (filter
    /// and detector state must not leak across recordings).
    pub fn reset(&mut self, ir_filter: F, red_filter: F, detector: D) {
        self.archive.clear();
        self.beats.clear();
        self.raw.clear();
        self.smoothed.clear();
        self.smoother.reset();
        self.beg_ms = None;
        self.dirty = false;
        self.ir_filter = ir_filter;
        self.red_filter = red_filter;
        self.detector = detector;
        log::info!("session cleared");
    }

    // --- ordered iteration for export consumers ---

    pub fn samples(&self) -> &[Sample] {
        self.archive.samples()
    }

    pub fn beats(&self) -> &[i64] {
        &self.beats
    }

    pub fn raw_rates(&self) -> &[HeartRate] {
        &self.raw
    }

    pub fn smoothed_rates(&self) -> &[HeartRate] {
        &self.smoothed
    }

    pub fn base_ms(&self) -> Option<i64> {
        self.beg_ms
    }

    /// True once any ingested data is not yet marked as saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // --- range/unit queries (read-only) ---

    /// Archive entries strictly later than the threshold.
    pub fn samples_later_than(&self, threshold: TimeRef) -> &[Sample] {
        self.archive.later_than(threshold.as_millis())
    }

    /// Beat timestamps strictly later than the threshold.
    pub fn beats_later_than(&self, threshold: TimeRef) -> &[i64] {
        let ms = threshold.as_millis();
        &self.beats[self.beats.partition_point(|&b| b <= ms)..]
    }

    /// Smoothed rates whose interval ends strictly later than the threshold.
    pub fn rates_later_than(&self, threshold: TimeRef) -> &[HeartRate] {
        let ms = threshold.as_millis();
        &self.smoothed[self.smoothed.partition_point(|h| h.end_ms <= ms)..]
    }

    /// Display-unit timestamp of the newest sample, for plot consumers that
    /// resume incremental reads from their last point.
    pub fn last_display_time(&self) -> Option<f64> {
        self.archive.last_ms().map(to_display_units)
    }

    pub fn set_series_enabled(&mut self, series: Series, enabled: bool) {
        self.series.set(series, enabled);
    }

    pub fn series_enabled(&self, series: Series) -> bool {
        self.series.get(series)
    }

    /// `(min, max)` across the enabled series over the trailing
    /// `window_seconds` of data, anchored at the newest archive entry. The
    /// window covers the whole collection when it reaches past the oldest
    /// entry. Empty archive or no enabled series yields `(0.0, 1.0)`.
    pub fn min_max(&self, window_seconds: f64) -> (f64, f64) {
        let Some(last_ms) = self.archive.last_ms() else {
            return (0.0, 1.0);
        };
        let start_ms = last_ms - (window_seconds * 1000.0).round() as i64;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut take = |v: f64| {
            min = min.min(v);
            max = max.max(v);
        };

        if self.series.ir || self.series.red {
            for s in self.archive.from_ms(start_ms) {
                if self.series.ir {
                    take(s.ir as f64);
                }
                if self.series.red {
                    take(s.red as f64);
                }
            }
        }
        if self.series.heart_rate {
            let i = self.smoothed.partition_point(|h| h.end_ms < start_ms);
            for h in &self.smoothed[i..] {
                take(h.bpm);
            }
        }

        if min > max {
            (0.0, 1.0)
        } else {
            (min, max)
        }
    }
}
