use std::ops::Range;

/// A histogram representation of a dataset's distribution.
///
/// The data range `[min, max]` is divided into equal-width bins. Every bin covers
/// `[start, end)` except the last one, which also includes `max` so that no value
/// falls off the right edge.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// The bins comprising the histogram, ordered by range.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates an equal-width histogram from unsorted values.
    ///
    /// Non-finite values are ignored.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points to create the histogram from.
    /// * `num_bins` - The number of bins to create.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_stats::histogram::Histogram;
    /// let values = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 6.0, 10.0];
    /// let histogram = Histogram::new(values, 5);
    /// assert_eq!(histogram.bins.len(), 5);
    /// assert_eq!(histogram.total_count(), 10);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Degenerate range: widen symmetrically so the single value sits mid-histogram
        let (min, max) = if max - min < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let bin_width = (max - min) / num_bins as f64;

        let mut bins = (0..num_bins)
            .map(|idx| {
                // Recompute edges from min to avoid floating-point accumulation errors
                let start = min + idx as f64 * bin_width;
                let end = if idx == num_bins - 1 {
                    max.next_up()
                } else {
                    min + (idx + 1) as f64 * bin_width
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for val in values {
            let idx = (((val - min) / bin_width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Total number of values counted across all bins.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Width of the bins, or `None` for an empty histogram.
    #[must_use]
    pub fn bin_width(&self) -> Option<f64> {
        self.bins.first().map(|bin| bin.range.end - bin.range.start)
    }

    /// Largest bin count.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        let histogram = Histogram::new(Vec::<f64>::new(), 20);
        assert!(histogram.bins.is_empty());
        assert_eq!(histogram.bin_width(), None);
    }

    #[test]
    fn test_max_lands_in_last_bin() {
        let histogram = Histogram::new([0.0, 5.0, 10.0], 2);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[1].count, 2);
    }

    #[test]
    fn test_single_value() {
        let histogram = Histogram::new([42.0, 42.0], 4);
        assert_eq!(histogram.total_count(), 2);
        assert_eq!(histogram.max_count(), 2);
        for bin in &histogram.bins {
            if bin.count > 0 {
                assert!(bin.range.contains(&42.0));
            }
        }
    }

    #[test]
    fn test_ignores_non_finite() {
        let histogram = Histogram::new([1.0, f64::NAN, 2.0, f64::INFINITY], 3);
        assert_eq!(histogram.total_count(), 2);
    }
}
