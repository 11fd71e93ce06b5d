//! Count-to-ratio normalization strategies.
//!
//! A normalizer turns one batch of raw counts into a closure mapping any
//! single count to a "hotness" ratio in [0, 1]. The closure is rebuilt from
//! the current batch on every publish tick, so the scaling statistic always
//! reflects the live distribution.

/// Ratio function built from one batch's statistics.
///
/// Monotonic non-decreasing in the input count and clamped to [0.0, 1.0]
/// for every input, including negatives and counts above the batch statistic.
pub type RatioFn = Box<dyn Fn(i64) -> f64 + Send + Sync>;

/// Strategy for normalizing raw counts against their batch.
pub trait Normalizer: Send + Sync {
    /// Unique identifier for this strategy.
    fn id(&self) -> &'static str;

    /// Build a ratio function from the batch's counts.
    fn build(&self, counts: &[i64]) -> RatioFn;
}

/// Logarithmic normalization against the batch maximum.
///
/// Key usage counts are heavily skewed toward a few dominant keys; log
/// compression keeps the low-frequency keys visually distinguishable instead
/// of collapsing them all near zero.
pub struct LogNormalizer;

impl Normalizer for LogNormalizer {
    fn id(&self) -> &'static str {
        "log"
    }

    fn build(&self, counts: &[i64]) -> RatioFn {
        let max = counts.iter().copied().max().unwrap_or(0);
        if max <= 0 {
            // No signal to normalize against: everything is coldest.
            return Box::new(|_| 0.0);
        }
        let log_max = (max as f64 + 1.0).ln();
        Box::new(move |v| {
            let v = v.max(0);
            let ratio = (v as f64 + 1.0).ln() / log_max;
            // Floating-point overshoot at v == max
            ratio.min(1.0)
        })
    }
}

/// Linear normalization clipped at a percentile threshold.
///
/// Counts at or above the chosen percentile saturate at 1.0, so a handful of
/// extreme outlier keys cannot stretch the scale for everything else.
pub struct PercentileClip {
    percentile: f64,
}

/// Default clipping percentile.
pub const DEFAULT_PERCENTILE: f64 = 0.95;

impl PercentileClip {
    /// Create a clipper for the given percentile, clamped to [0.0, 1.0].
    pub fn new(percentile: f64) -> Self {
        Self {
            percentile: percentile.clamp(0.0, 1.0),
        }
    }
}

impl Default for PercentileClip {
    fn default() -> Self {
        Self::new(DEFAULT_PERCENTILE)
    }
}

impl Normalizer for PercentileClip {
    fn id(&self) -> &'static str {
        "percentile"
    }

    fn build(&self, counts: &[i64]) -> RatioFn {
        let mut sorted = counts.to_vec();
        sorted.sort_unstable();
        let index = (sorted.len() as f64 * self.percentile) as usize;
        let index = index.min(sorted.len().saturating_sub(1));
        let threshold = sorted.get(index).copied().unwrap_or(0);
        if threshold <= 0 {
            return Box::new(|_| 0.0);
        }
        let threshold = threshold as f64;
        Box::new(move |v| (v.max(0) as f64 / threshold).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_log_basic_scaling() {
        let ratio = LogNormalizer.build(&[1, 2, 100]);

        // The batch max lands exactly at 1.0: ln(101)/ln(101)
        assert_eq!(ratio(100), 1.0);

        // Lower counts are compressed but stay above zero
        let r1 = ratio(1);
        let r2 = ratio(2);
        assert!(r1 > 0.0 && r1 < r2 && r2 < 1.0, "expected 0 < {} < {} < 1", r1, r2);
    }

    #[test]
    fn test_log_degenerate_batches() {
        // Empty batch and all-zero batch both yield the constant-zero function
        let empty = LogNormalizer.build(&[]);
        let zeros = LogNormalizer.build(&[0, 0, 0]);
        for v in [0, 1, 50, 1_000_000] {
            assert_eq!(empty(v), 0.0);
            assert_eq!(zeros(v), 0.0);
        }
    }

    #[test]
    fn test_log_clamps_out_of_range_inputs() {
        let ratio = LogNormalizer.build(&[10]);
        assert_eq!(ratio(-5), 0.0, "negative counts clamp to 0");
        assert_eq!(ratio(10_000), 1.0, "counts above the batch max saturate");
    }

    #[test]
    fn test_log_single_record_batch() {
        let ratio = LogNormalizer.build(&[7]);
        assert_eq!(ratio(7), 1.0);
        assert_eq!(ratio(0), 0.0);
    }

    #[test]
    fn test_percentile_clip_reference_case() {
        // sorted = [5, 10, 20, 100], index = floor(4 * 0.95) = 3, threshold = 100
        let ratio = PercentileClip::new(0.95).build(&[5, 10, 20, 100]);
        assert_eq!(ratio(100), 1.0);
        assert_eq!(ratio(50), 0.5);
        assert_eq!(ratio(0), 0.0);
    }

    #[test]
    fn test_percentile_clip_saturates_outliers() {
        // index = floor(5 * 0.5) = 2, threshold = 3: everything >= 3 is maximally hot
        let ratio = PercentileClip::new(0.5).build(&[1, 2, 3, 500, 10_000]);
        assert_eq!(ratio(3), 1.0);
        assert_eq!(ratio(500), 1.0);
        assert_eq!(ratio(10_000), 1.0);
        assert!(ratio(1) < 1.0);
    }

    #[test]
    fn test_percentile_clip_degenerate_batches() {
        let empty = PercentileClip::default().build(&[]);
        let zeros = PercentileClip::default().build(&[0, 0, 0]);
        for v in [0, 1, 50] {
            assert_eq!(empty(v), 0.0);
            assert_eq!(zeros(v), 0.0);
        }
    }

    #[test]
    fn test_percentile_clip_exact_percentile_index() {
        // percentile 1.0 would index one past the end; it clamps to the last element
        let ratio = PercentileClip::new(1.0).build(&[2, 4]);
        assert_eq!(ratio(4), 1.0);
        assert_eq!(ratio(2), 0.5);
    }

    #[test]
    fn test_percentile_clip_negative_inputs() {
        let ratio = PercentileClip::new(0.95).build(&[10]);
        assert_eq!(ratio(-3), 0.0);
    }

    proptest! {
        #[test]
        fn prop_log_ratio_in_unit_interval(
            counts in prop::collection::vec(0i64..1_000_000, 0..64),
            probe in -10i64..1_000_000,
        ) {
            let ratio = LogNormalizer.build(&counts);
            let r = ratio(probe);
            prop_assert!((0.0..=1.0).contains(&r), "ratio {} out of range", r);
        }

        #[test]
        fn prop_percentile_ratio_in_unit_interval(
            counts in prop::collection::vec(0i64..1_000_000, 0..64),
            percentile in 0.0f64..=1.0,
            probe in -10i64..1_000_000,
        ) {
            let ratio = PercentileClip::new(percentile).build(&counts);
            let r = ratio(probe);
            prop_assert!((0.0..=1.0).contains(&r), "ratio {} out of range", r);
        }

        #[test]
        fn prop_both_strategies_monotonic(
            counts in prop::collection::vec(0i64..1_000_000, 1..64),
            a in 0i64..1_000_000,
            b in 0i64..1_000_000,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let log_ratio = LogNormalizer.build(&counts);
            prop_assert!(log_ratio(lo) <= log_ratio(hi));
            let clip_ratio = PercentileClip::default().build(&counts);
            prop_assert!(clip_ratio(lo) <= clip_ratio(hi));
        }
    }
}
