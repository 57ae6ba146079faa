//! Survival report tables
//!
//! Console tables for the cleaned clinical data and the per-group
//! Kaplan-Meier statistics.

use std::fmt::Display;

use oncolens_analysis::{clinical::MetastasisLabel, survival::SurvivalByGroup};
use oncolens_stats::descriptive::DescriptiveStats;

use crate::util::format_opt;

/// Print per-column missing-value counts
pub(super) fn print_missing_counts(counts: &[(String, usize)]) {
    let width = counts
        .iter()
        .map(|(column, _)| column.chars().count())
        .max()
        .unwrap_or(0);
    for (column, count) in counts {
        println!("{column:<width$}  {count:>6}");
    }
}

fn print_summary_header(label_col: &str) {
    println!(
        "  {:<20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        label_col, "Count", "Mean", "Median", "Std", "Min", "Max",
    );
    // label(20) + count(8) + 5 * value(10) + spaces(6)
    println!("  {}", "-".repeat(84));
}

fn print_summary_row(label: &str, stats: &DescriptiveStats) {
    println!(
        "  {:<20} {:>8} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
        label, stats.count, stats.mean, stats.median, stats.std_dev, stats.min, stats.max,
    );
}

/// Print overall survival duration summary, overall and per metastasis group
pub(super) fn print_duration_summary(
    durations: &[f64],
    by_label: &[(MetastasisLabel, Vec<f64>)],
) {
    println!("Overall Survival (Months)");
    print_summary_header("Group");
    match DescriptiveStats::new(durations.iter().copied()) {
        Some(stats) => print_summary_row("All", &stats),
        None => println!("  (no records)"),
    }
    for (label, values) in by_label {
        if let Some(stats) = DescriptiveStats::new(values.iter().copied()) {
            print_summary_row(&label.to_string(), &stats);
        }
    }
}

/// Print a formatted Kaplan-Meier statistics table
///
/// Groups skipped for lack of records are listed below the table.
pub(super) fn print_survival_table<K>(label_col: &str, survival: &SurvivalByGroup<K>)
where
    K: Display,
{
    println!(
        "  {:<20} {:>8} {:>8} {:>10} {:>12} {:>12} {:>12}",
        label_col, "Subjects", "Events", "Censored%", "Mean(Event)", "Mean(All)", "Median(KM)",
    );
    // label(20) + subjects(8) + events(8) + censored%(10) + 3 * value(12) + spaces(6)
    println!("  {}", "-".repeat(88));

    for group in &survival.groups {
        let stats = &group.stats;
        println!(
            "  {:<20} {:>8} {:>8} {:>9.1}% {:>12} {:>12.1} {:>12}",
            group.label.to_string(),
            stats.subjects,
            stats.events(),
            stats.censoring_rate(),
            format_opt(stats.mean_event, 1),
            stats.mean_all,
            stats
                .median_km
                .map_or_else(|| "N/A".to_owned(), |m| format!("{m:.1}")),
        );
    }
    for skipped in &survival.skipped {
        println!("  {skipped:<20} (no data)");
    }
}

/// Print legend explaining table columns
pub(super) fn print_legend() {
    println!("Legend:");
    println!("  Censored%   : Share of patients alive at last follow-up");
    println!("  Mean(Event) : Mean survival of deceased patients only");
    println!("  Mean(All)   : Naive mean of all durations (biased low under censoring)");
    println!("  Median(KM)  : Kaplan-Meier median survival (N/A when S(t) stays above 0.5)");
}
