//! Clinical survival analysis command
//!
//! Loads a clinical patient table, cleans it, describes the survival duration
//! distribution and fits one Kaplan-Meier curve per metastasis group.

mod export;
mod figures;
mod table;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use oncolens_analysis::{
    clinical::{clean_clinical, load_clinical_table},
    survival::SurvivalByGroup,
};

use crate::{config::SurvivalConfig, plot::FigureWriter};

#[derive(Debug, Clone, Args)]
pub(crate) struct SurvivalArg {
    /// Path to the clinical patient table (tab-separated, `#` metadata lines)
    pub clinical_file: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save figures as SVG files
    #[arg(long)]
    pub save_figures: bool,

    /// Directory for saved figures
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write Kaplan-Meier curves to this CSV file
    #[arg(long)]
    pub km_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SurvivalArg) -> anyhow::Result<()> {
    let config = SurvivalConfig::load(arg.config.as_deref())?;

    if !arg.clinical_file.exists() {
        tracing::warn!("File not found: {}", arg.clinical_file.display());
        return Ok(());
    }

    let raw = load_clinical_table(&arg.clinical_file, &config.load);
    println!("First 5 rows of the clinical data:");
    println!("{}", raw.head(5));

    let cleaned = clean_clinical(&raw, &config.schema).with_context(|| {
        format!(
            "Failed to clean clinical data: {}",
            arg.clinical_file.display()
        )
    })?;
    println!("Data cleaning complete. Missing values per column:");
    table::print_missing_counts(&cleaned.missing_counts);
    println!();
    println!("Cleaned Data Overview (first 5 rows):");
    println!("{}", cleaned.table.head(5));

    let records = cleaned.records();
    let durations = cleaned.durations();
    let by_label = cleaned.durations_by_label();

    table::print_duration_summary(&durations, &by_label);
    println!();

    let survival = SurvivalByGroup::by_metastasis(&records);
    println!("Kaplan-Meier Survival by Metastasis Status");
    table::print_survival_table("Group", &survival);
    println!();
    table::print_legend();

    let figure_writer = FigureWriter::new(arg.save_figures, &arg.output_dir);
    figures::render_histogram(&figure_writer, &durations, config.histogram_bins)?;
    figures::render_boxplot(&figure_writer, &by_label)?;
    figures::render_km_curves(&figure_writer, &survival)?;

    if let Some(path) = &arg.km_output {
        export::save_km_curves(path, &survival)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const CLINICAL: &str = "\
#Patient Identifier\tOverall Survival Status\tMetastasis\tOverall Survival (Months)
#STRING\tSTRING\tSTRING\tNUMBER
PATIENT_ID\tOS_STATUS\tMETASTASIS\tOS_MONTHS
P1\t1:DECEASED\tM1\t12.5
P2\t0:LIVING\tM0\t40
P3\t1:DECEASED\tM0\t25
P4\t0:LIVING\tM1\t8
P5\t1:DECEASED\tM0\t60.2
";

    fn arg(dir: &std::path::Path, clinical_file: PathBuf) -> SurvivalArg {
        SurvivalArg {
            clinical_file,
            config: None,
            save_figures: true,
            output_dir: dir.join("figures"),
            km_output: Some(dir.join("km.csv")),
        }
    }

    #[test]
    fn test_full_run_writes_figures_and_curves() {
        let dir = tempfile::tempdir().unwrap();
        let clinical_file = dir.path().join("data_clinical_patient.txt");
        fs::write(&clinical_file, CLINICAL).unwrap();

        run(&arg(dir.path(), clinical_file)).unwrap();

        for name in [
            "survival_histogram.svg",
            "survival_boxplot.svg",
            "km_survival_curves.svg",
        ] {
            assert!(dir.path().join("figures").join(name).is_file(), "{name}");
        }
        let csv = fs::read_to_string(dir.path().join("km.csv")).unwrap();
        assert!(csv.starts_with("group,time,survival_prob,lower,upper,at_risk,events\n"));
        assert!(csv.contains("\nMetastasis,"));
        assert!(csv.contains("\nNo Metastasis,"));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let clinical_file = dir.path().join("absent.txt");
        run(&arg(dir.path(), clinical_file)).unwrap();
        assert!(!dir.path().join("km.csv").exists());
    }

    #[test]
    fn test_missing_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let clinical_file = dir.path().join("clinical.txt");
        fs::write(&clinical_file, "PATIENT_ID\tOS_STATUS\nP1\tLIVING\n").unwrap();
        let err = run(&arg(dir.path(), clinical_file)).unwrap_err();
        assert!(format!("{err:#}").contains("METASTASIS"));
    }
}
