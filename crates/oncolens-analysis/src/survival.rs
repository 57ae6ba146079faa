//! Survival analysis for right-censored clinical data
//!
//! This module fits Kaplan-Meier curves per patient group.
//!
//! # Overview
//!
//! A patient record ends in one of two ways:
//!
//! - **Event**: death observed at the recorded duration
//! - **Censored**: the patient was alive at last follow-up (death not observed)
//!
//! Naive means over all durations underestimate survival because censored
//! patients lived at least as long as recorded. The Kaplan-Meier estimator
//! accounts for censoring.
//!
//! ```text
//! Event:     |----x    (died at 24 months)
//! Censored:  |------->  (alive at 60 months, true survival unknown)
//! ```
//!
//! # Grouping
//!
//! Groups are discovered in the order their key first appears. A record whose key is
//! missing still registers a group, but a missing key never equals anything, so that
//! group selects no records and is skipped with a diagnostic instead of being fitted.
//!
//! # Example
//!
//! ```
//! use oncolens_analysis::{
//!     clinical::{ClinicalSchema, clean_clinical},
//!     survival::SurvivalByGroup,
//!     table::{LoadOptions, Table},
//! };
//!
//! let text = "OS_STATUS\tMETASTASIS\tOS_MONTHS\n\
//!             1:DECEASED\tM1\t12\n\
//!             0:LIVING\tM0\t40\n";
//! let table = Table::from_reader(text.as_bytes(), &LoadOptions::default()).unwrap();
//! let cleaned = clean_clinical(&table, &ClinicalSchema::default()).unwrap();
//!
//! let survival = SurvivalByGroup::by_metastasis(&cleaned.records());
//! for group in &survival.groups {
//!     println!("{}: {} subjects", group.label, group.stats.subjects);
//! }
//! ```

use oncolens_stats::survival::{KaplanMeierCurve, Observation};

use crate::{
    clinical::{ClinicalRecord, MetastasisLabel},
    table::MISSING_DISPLAY,
};

/// Survival statistics for a group of observations
#[derive(Debug, Clone)]
pub struct SurvivalStats {
    /// Total number of observations
    pub subjects: usize,
    /// Number of censored observations
    pub censored_count: usize,
    /// Mean duration of observations with an observed event
    pub mean_event: Option<f64>,
    /// Naive mean duration of all observations (biased low under censoring)
    pub mean_all: f64,
    /// Kaplan-Meier median survival time
    pub median_km: Option<f64>,
    /// Kaplan-Meier survival curve
    pub km_curve: KaplanMeierCurve,
}

impl SurvivalStats {
    /// Fit survival statistics from observations.
    ///
    /// Returns `None` for an empty observation set.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_observations(data: &[Observation]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let subjects = data.len();
        let censored_count = data.iter().filter(|obs| !obs.event).count();

        let event_durations = data
            .iter()
            .filter(|obs| obs.event)
            .map(|obs| obs.duration)
            .collect::<Vec<_>>();
        let mean_event = (!event_durations.is_empty())
            .then(|| event_durations.iter().sum::<f64>() / event_durations.len() as f64);
        let mean_all = data.iter().map(|obs| obs.duration).sum::<f64>() / subjects as f64;

        let km_curve = KaplanMeierCurve::from_observations(data.to_vec());
        let median_km = km_curve.median_survival();

        Some(Self {
            subjects,
            censored_count,
            mean_event,
            mean_all,
            median_km,
            km_curve,
        })
    }

    /// Censoring rate as percentage
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn censoring_rate(&self) -> f64 {
        100.0 * self.censored_count as f64 / self.subjects as f64
    }

    #[must_use]
    pub fn events(&self) -> usize {
        self.subjects - self.censored_count
    }
}

/// Survival statistics of one group.
#[derive(Debug, Clone)]
pub struct GroupSurvival<K> {
    pub label: K,
    pub stats: SurvivalStats,
}

/// Survival statistics per group, in order of first appearance.
#[derive(Debug, Clone)]
pub struct SurvivalByGroup<K> {
    /// Fitted groups.
    pub groups: Vec<GroupSurvival<K>>,
    /// Display names of groups that were discovered but had no records.
    pub skipped: Vec<String>,
}

impl<K> SurvivalByGroup<K>
where
    K: Clone + PartialEq + std::fmt::Display,
{
    /// Collect survival statistics grouped by a custom key
    ///
    /// For each item, `observe` yields the group key (possibly missing) and the
    /// observation. Exactly one curve is fitted per group that selects at least
    /// one record.
    pub fn collect_by_group<T, F>(items: &[T], observe: F) -> Self
    where
        F: FnMut(&T) -> (Option<K>, Observation),
    {
        let observations = items.iter().map(observe).collect::<Vec<_>>();
        let mut discovered: Vec<Option<K>> = vec![];
        for (key, _) in &observations {
            if !discovered.contains(key) {
                discovered.push(key.clone());
            }
        }

        let mut groups = vec![];
        let mut skipped = vec![];
        for key in discovered {
            // A missing key matches no record, not even another missing key
            let selected = observations
                .iter()
                .filter(|(k, _)| key.is_some() && *k == key)
                .map(|(_, obs)| *obs)
                .collect::<Vec<_>>();
            let group_name = key
                .as_ref()
                .map_or_else(|| MISSING_DISPLAY.to_owned(), ToString::to_string);
            match (key, SurvivalStats::from_observations(&selected)) {
                (Some(label), Some(stats)) => {
                    tracing::debug!(
                        group = %group_name,
                        subjects = stats.subjects,
                        "fitted Kaplan-Meier curve"
                    );
                    groups.push(GroupSurvival { label, stats });
                }
                _ => {
                    tracing::warn!("No data available for group: {group_name}");
                    skipped.push(group_name);
                }
            }
        }

        Self { groups, skipped }
    }
}

impl SurvivalByGroup<MetastasisLabel> {
    /// Kaplan-Meier statistics per metastasis label.
    #[must_use]
    pub fn by_metastasis(records: &[ClinicalRecord]) -> Self {
        Self::collect_by_group(records, |record| {
            (
                record.label,
                Observation::new(record.months, record.event),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, event: bool, months: f64) -> ClinicalRecord {
        ClinicalRecord {
            status: Some(if event { "1:DECEASED" } else { "0:LIVING" }.to_owned()),
            event,
            metastasis_code: code.to_owned(),
            label: MetastasisLabel::from_code(code),
            months,
        }
    }

    #[test]
    fn test_one_fit_per_group_in_discovery_order() {
        let records = vec![
            record("M1", true, 10.0),
            record("M0", true, 20.0),
            record("M0", true, 30.0),
            record("M1", false, 40.0),
            record("M0", false, 50.0),
        ];
        let survival = SurvivalByGroup::by_metastasis(&records);
        assert_eq!(survival.groups.len(), 2);
        assert!(survival.skipped.is_empty());
        assert_eq!(survival.groups[0].label, MetastasisLabel::Metastasis);
        assert_eq!(survival.groups[1].label, MetastasisLabel::NoMetastasis);
        assert_eq!(survival.groups[0].stats.subjects, 2);
        assert_eq!(survival.groups[1].stats.subjects, 3);
        assert_eq!(survival.groups[1].stats.events(), 2);
    }

    #[test]
    fn test_unlabeled_records_form_a_skipped_group() {
        let records = vec![
            record("MX", true, 5.0),
            record("M0", true, 20.0),
            record("M9", false, 7.0),
        ];
        let survival = SurvivalByGroup::by_metastasis(&records);
        assert_eq!(survival.groups.len(), 1);
        assert_eq!(survival.skipped, vec![MISSING_DISPLAY.to_owned()]);
    }

    #[test]
    fn test_group_statistics() {
        let data = [
            Observation::new(10.0, true),
            Observation::new(20.0, false),
            Observation::new(30.0, true),
            Observation::new(40.0, false),
        ];
        let stats = SurvivalStats::from_observations(&data).unwrap();
        assert_eq!(stats.censored_count, 2);
        assert_eq!(stats.censoring_rate(), 50.0);
        assert_eq!(stats.mean_event, Some(20.0));
        assert_eq!(stats.mean_all, 25.0);
        // S(10) = 3/4, S(30) = 3/4 * 1/2
        assert_eq!(stats.median_km, Some(30.0));
    }

    #[test]
    fn test_empty_group_has_no_statistics() {
        assert!(SurvivalStats::from_observations(&[]).is_none());
    }
}
