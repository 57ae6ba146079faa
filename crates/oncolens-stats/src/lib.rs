//! Statistical kernels for the oncolens pipelines.
//!
//! This crate provides the numeric building blocks used by the clinical and
//! expression analyses:
//!
//! - **Descriptive statistics**: mean, median, sample variance, missing-aware means
//! - **Percentiles**: linearly interpolated quantiles
//! - **Histogram generation**: equal-width frequency distributions
//! - **Kernel density**: Gaussian KDE with Scott's bandwidth for density overlays
//! - **Box plots**: Tukey five-number summaries with outliers
//! - **Survival analysis**: Kaplan-Meier estimator with a Greenwood confidence band
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use oncolens_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Summarizing a group for a box plot
//!
//! ```
//! use oncolens_stats::boxplot::BoxPlotSummary;
//!
//! let summary = BoxPlotSummary::new([12.0, 30.5, 44.0, 61.2, 80.0]).unwrap();
//! assert_eq!(summary.median, 44.0);
//! ```
//!
//! ## Analyzing survival data
//!
//! ```
//! use oncolens_stats::survival::{KaplanMeierCurve, Observation};
//!
//! let data = vec![
//!     Observation::new(10.0, true),  // Event occurred at month 10
//!     Observation::new(20.0, false), // Censored at month 20
//!     Observation::new(30.0, true),  // Event occurred at month 30
//! ];
//! let curve = KaplanMeierCurve::from_observations(data);
//! assert_eq!(curve.times.len(), 2);
//! ```

pub mod boxplot;
pub mod descriptive;
pub mod histogram;
pub mod kde;
pub mod percentiles;
pub mod survival;
