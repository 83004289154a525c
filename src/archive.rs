use crate::types::Sample;

/// Deduplicating, timestamp-ordered store of filtered samples.
///
/// Timestamps are monotonically non-decreasing in practice, so an append-only
/// sorted vector with binary-search insertion beats a general ordered set:
/// the common case is a push onto the end.
#[derive(Default)]
pub struct SampleArchive {
    samples: Vec<Sample>,
}

impl SampleArchive {
    /// Inserts under set semantics: a duplicate timestamp overwrites the
    /// stored sample in place (last write wins) and does not grow the
    /// archive. Returns `true` when the sample is new.
    ///
    /// Note: overwriting does not reconcile beats or rates already derived
    /// from the old value; downstream entries computed before the overwrite
    /// keep their original inputs.
    pub fn insert(&mut self, sample: Sample) -> bool {
        // Fast path: strictly newer than everything stored.
        if self.last_ms().map_or(true, |last| sample.timestamp_ms > last) {
            self.samples.push(sample);
            return true;
        }
        match self
            .samples
            .binary_search_by_key(&sample.timestamp_ms, |s| s.timestamp_ms)
        {
            Ok(i) => {
                self.samples[i] = sample;
                false
            }
            Err(i) => {
                self.samples.insert(i, sample);
                true
            }
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_ms(&self) -> Option<i64> {
        self.samples.last().map(|s| s.timestamp_ms)
    }

    /// Index of the first entry with `timestamp_ms > threshold_ms`.
    pub fn index_later_than(&self, threshold_ms: i64) -> usize {
        self.samples
            .partition_point(|s| s.timestamp_ms <= threshold_ms)
    }

    /// All entries strictly newer than the threshold; empty when none are.
    pub fn later_than(&self, threshold_ms: i64) -> &[Sample] {
        &self.samples[self.index_later_than(threshold_ms)..]
    }

    /// All entries with `timestamp_ms >= start_ms`. When the start precedes
    /// the data this is the whole archive.
    pub fn from_ms(&self, start_ms: i64) -> &[Sample] {
        let i = self.samples.partition_point(|s| s.timestamp_ms < start_ms);
        &self.samples[i..]
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, v: f32) -> Sample {
        Sample {
            timestamp_ms: ts,
            ir: v,
            red: -v,
        }
    }

    #[test]
    fn inserts_stay_sorted_and_unique() {
        let mut a = SampleArchive::default();
        for ts in [30, 10, 20, 20, 40] {
            a.insert(sample(ts, ts as f32));
        }
        let got: Vec<i64> = a.samples().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(got, vec![10, 20, 30, 40]);
        for w in a.samples().windows(2) {
            assert!(w[0].timestamp_ms < w[1].timestamp_ms);
        }
    }

    #[test]
    fn duplicate_overwrites_without_growth() {
        let mut a = SampleArchive::default();
        assert!(a.insert(sample(100, 1.0)));
        assert!(!a.insert(sample(100, 2.0)));
        assert_eq!(a.len(), 1);
        assert_eq!(a.samples()[0].ir, 2.0);
    }

    #[test]
    fn later_than_is_strict() {
        let mut a = SampleArchive::default();
        for ts in [10, 20, 30] {
            a.insert(sample(ts, 0.0));
        }
        assert_eq!(a.later_than(20).len(), 1);
        assert_eq!(a.later_than(20)[0].timestamp_ms, 30);
        assert_eq!(a.later_than(5).len(), 3);
        assert!(a.later_than(30).is_empty());
        assert!(a.later_than(i64::MAX).is_empty());
    }

    #[test]
    fn from_ms_is_inclusive_and_clamps() {
        let mut a = SampleArchive::default();
        for ts in [0, 1000, 2000, 3000] {
            a.insert(sample(ts, 0.0));
        }
        assert_eq!(a.from_ms(1000).len(), 3);
        // A window start before the data falls back to the full archive.
        assert_eq!(a.from_ms(-5000).len(), 4);
    }
}
