use crate::types::HeartRate;

/// Mean of `values` after dropping `floor(trim_fraction * len)` entries from
/// each end of the sorted sequence. `None` only when nothing survives the
/// trim (empty input, or `trim_fraction >= 0.5`).
pub fn trimmed_mean(values: &mut [f64], trim_fraction: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let cut = ((trim_fraction * values.len() as f64).floor() as usize).min(values.len());
    let kept = values.get(cut..values.len() - cut)?;
    if kept.is_empty() {
        return None;
    }
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Incremental outlier-trimmed moving average over the raw bpm sequence.
///
/// Each call picks up exactly where the previous one stopped; re-running on
/// an unchanged raw sequence appends nothing. The output is identical to a
/// full from-scratch recomputation over the same raw entries.
pub struct QuantileSmoother {
    window: usize,
    trim_fraction: f64,
    processed: usize,
}

impl QuantileSmoother {
    pub fn new(window: usize, trim_fraction: f64) -> Self {
        Self {
            window: window.max(1),
            trim_fraction,
            processed: 0,
        }
    }

    /// Appends one smoothed entry per raw entry past the previous high-water
    /// mark. `smoothed[i]` covers the same interval as `raw[i]`, with its bpm
    /// replaced by the trimmed mean of `raw[max(0, i-window+1)..=i]`.
    /// Returns the number of entries appended.
    pub fn extend(&mut self, raw: &[HeartRate], smoothed: &mut Vec<HeartRate>) -> usize {
        debug_assert_eq!(smoothed.len(), self.processed);
        let start = self.processed;
        if start >= raw.len() {
            // Nothing past the mark; a shorter-than-before slice must not
            // move the mark backwards.
            return 0;
        }
        for i in start..raw.len() {
            let lo = (i + 1).saturating_sub(self.window);
            let mut window: Vec<f64> = raw[lo..=i].iter().map(|h| h.bpm).collect();
            let bpm = trimmed_mean(&mut window, self.trim_fraction).unwrap_or(raw[i].bpm);
            smoothed.push(HeartRate {
                begin_ms: raw[i].begin_ms,
                end_ms: raw[i].end_ms,
                bpm,
            });
        }
        self.processed = raw.len();
        raw.len() - start
    }

    pub fn reset(&mut self) {
        self.processed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn run_trimmed_mean(vals: &[f64], trim: f64, expected: Option<f64>) {
        let mut vals = vals.to_vec();
        assert_eq!(trimmed_mean(&mut vals, trim), expected);
    }

    #[test]
    fn trimmed_mean_drops_outliers() {
        // 5 values, trim 30% => floor(1.5) = 1 dropped from each end.
        run_trimmed_mean(&[50.0, 52.0, 200.0, 48.0, 51.0], 0.3, Some(51.0));
    }

    #[test]
    fn small_windows_degrade_to_plain_mean() {
        // floor(0.3 * n) == 0 for n < 4: nothing is trimmed.
        run_trimmed_mean(&[10.0], 0.3, Some(10.0));
        run_trimmed_mean(&[10.0, 20.0], 0.3, Some(15.0));
        run_trimmed_mean(&[10.0, 20.0, 90.0], 0.3, Some(40.0));
    }

    #[test]
    fn trimmed_mean_edge_inputs() {
        run_trimmed_mean(&[], 0.3, None);
        // Trimming half or more from both ends leaves nothing.
        run_trimmed_mean(&[1.0, 2.0], 0.5, None);
    }

    fn raw_from_bpms(bpms: &[f64]) -> Vec<HeartRate> {
        bpms.iter()
            .enumerate()
            .map(|(i, &bpm)| HeartRate {
                begin_ms: i as i64 * 500,
                end_ms: (i + 1) as i64 * 500,
                bpm,
            })
            .collect()
    }

    #[test]
    fn incremental_matches_batch() {
        let raw = raw_from_bpms(&[
            60.0, 62.0, 61.0, 180.0, 63.0, 64.0, 30.0, 65.0, 66.0, 64.0, 63.0, 62.0,
        ]);

        let mut batch = Vec::new();
        QuantileSmoother::new(10, 0.3).extend(&raw, &mut batch);

        let mut incremental = Vec::new();
        let mut smoother = QuantileSmoother::new(10, 0.3);
        for n in 0..=raw.len() {
            smoother.extend(&raw[..n], &mut incremental);
        }

        assert_eq!(batch.len(), raw.len());
        assert_eq!(incremental, batch);
    }

    #[test]
    fn extend_is_idempotent_on_unchanged_input() {
        let raw = raw_from_bpms(&[60.0, 61.0, 62.0]);
        let mut smoothed = Vec::new();
        let mut smoother = QuantileSmoother::new(10, 0.3);
        assert_eq!(smoother.extend(&raw, &mut smoothed), 3);
        assert_eq!(smoother.extend(&raw, &mut smoothed), 0);
        assert_eq!(smoothed.len(), 3);
    }

    #[test]
    fn truncated_input_appends_nothing_and_keeps_the_mark() {
        let raw = raw_from_bpms(&[60.0, 61.0, 62.0, 63.0]);
        let mut smoothed = Vec::new();
        let mut smoother = QuantileSmoother::new(10, 0.3);
        assert_eq!(smoother.extend(&raw, &mut smoothed), 4);

        // A slice shorter than what was already processed is a no-op.
        assert_eq!(smoother.extend(&raw[..2], &mut smoothed), 0);
        assert_eq!(smoothed.len(), 4);

        // The mark did not move backwards: the full slice stays processed.
        assert_eq!(smoother.extend(&raw, &mut smoothed), 0);
        assert_eq!(smoothed.len(), 4);
    }

    #[test]
    fn smoothed_keeps_raw_intervals() {
        let raw = raw_from_bpms(&[100.0, 120.0]);
        let mut smoothed = Vec::new();
        QuantileSmoother::new(10, 0.3).extend(&raw, &mut smoothed);
        assert_eq!(smoothed[1].begin_ms, raw[1].begin_ms);
        assert_eq!(smoothed[1].end_ms, raw[1].end_ms);
        // Window of two: plain mean.
        assert_eq!(smoothed[1].bpm, 110.0);
    }
}
