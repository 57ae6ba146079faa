use std::{fmt::Write as _, fs, path::Path};

use anyhow::Context;
use oncolens_analysis::survival::SurvivalByGroup;

use crate::util;

pub(super) const KM_CSV_HEADER: &str = "group,time,survival_prob,lower,upper,at_risk,events";

/// Writes every group's Kaplan-Meier curve as CSV rows.
pub(super) fn save_km_curves<K>(path: &Path, survival: &SurvivalByGroup<K>) -> anyhow::Result<()>
where
    K: std::fmt::Display,
{
    util::create_parent_dir(path)?;
    let mut csv_content = format!("{KM_CSV_HEADER}\n");

    for group in &survival.groups {
        let km = &group.stats.km_curve;
        for i in 0..km.times.len() {
            writeln!(
                &mut csv_content,
                "{},{},{},{},{},{},{}",
                group.label,
                km.times[i],
                km.survival_prob[i],
                km.lower[i],
                km.upper[i],
                km.at_risk[i],
                km.events[i]
            )
            .with_context(|| format!("Failed to write CSV data for group {}", group.label))?;
        }
    }

    fs::write(path, csv_content)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    println!("KM curves saved to: {}", path.display());

    Ok(())
}
