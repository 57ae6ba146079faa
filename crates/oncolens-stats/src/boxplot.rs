use crate::{descriptive::DescriptiveStats, percentiles::Percentiles};

/// Tukey box-plot summary of a dataset.
///
/// The box spans the first to third quartile. Whiskers reach the most extreme
/// observations still within `1.5 × IQR` of the box; anything beyond is an outlier.
///
/// # Examples
///
/// ```
/// use oncolens_stats::boxplot::BoxPlotSummary;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
/// let summary = BoxPlotSummary::new(values).unwrap();
///
/// assert_eq!(summary.median, 5.5);
/// assert_eq!(summary.outliers, vec![100.0]);
/// assert_eq!(summary.upper_whisker, 9.0);
/// ```
#[derive(Debug, Clone)]
pub struct BoxPlotSummary {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// First quartile (P25).
    pub q1: f64,
    /// Median (P50).
    pub median: f64,
    /// Third quartile (P75).
    pub q3: f64,
    /// Lowest observation within `q1 - 1.5 × IQR`.
    pub lower_whisker: f64,
    /// Highest observation within `q3 + 1.5 × IQR`.
    pub upper_whisker: f64,
    /// Observations outside the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl BoxPlotSummary {
    const WHISKER_IQR_FACTOR: f64 = 1.5;

    /// Computes the summary from unsorted values.
    ///
    /// Returns `None` if the dataset is empty.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Computes the summary from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let quartiles = Percentiles::from_sorted(sorted_values, &[25.0, 50.0, 75.0]);
        let q1 = quartiles.get(25.0)?;
        let median = quartiles.get(50.0)?;
        let q3 = quartiles.get(75.0)?;

        let reach = Self::WHISKER_IQR_FACTOR * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let lower_whisker = sorted_values
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted_values
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted_values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            stats,
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(BoxPlotSummary::new(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_no_outliers() {
        let summary = BoxPlotSummary::new([3.0, 1.0, 2.0, 5.0, 4.0]).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.iqr(), 2.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn test_low_outlier() {
        let summary = BoxPlotSummary::new([-50.0, 10.0, 11.0, 12.0, 13.0]).unwrap();
        assert_eq!(summary.outliers, vec![-50.0]);
        assert_eq!(summary.lower_whisker, 10.0);
    }
}
