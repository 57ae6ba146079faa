//! Differential expression analysis command
//!
//! Discovers per-sample expression files, averages the replicates of each
//! sample group and compares a treatment group against a baseline group.

mod export;
mod figures;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use oncolens_analysis::{
    differential::differential,
    discovery::{GlobLister, discover_samples},
    expression::{AggregatedGroup, ExpressionError, aggregate_replicates, load_replicates},
    significance::{
        RegulationSummary, expression_filter, label_regulation, significant_genes,
        top_genes_by_abs_fc,
    },
};

use crate::{config::ExpressionConfig, plot::FigureWriter};

#[derive(Debug, Clone, Args)]
pub(crate) struct ExpressionArg {
    /// Directory holding the gzip-compressed sample CSV files
    pub data_dir: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Baseline sample group
    #[arg(long)]
    pub baseline: Option<String>,

    /// Treatment sample group
    #[arg(long)]
    pub treatment: Option<String>,

    /// Absolute log2 fold change a gene must exceed to be significant
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Minimum group-average expression of at least one group
    #[arg(long)]
    pub expr_floor: Option<f64>,

    /// Number of genes shown in the heatmap
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Save figures as SVG files
    #[arg(long)]
    pub save_figures: bool,

    /// Directory for saved figures
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write the labeled gene table to this CSV file
    #[arg(long)]
    pub table_output: Option<PathBuf>,
}

impl ExpressionArg {
    fn apply_overrides(&self, config: &mut ExpressionConfig) {
        if let Some(baseline) = &self.baseline {
            config.baseline.clone_from(baseline);
        }
        if let Some(treatment) = &self.treatment {
            config.treatment.clone_from(treatment);
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(floor) = self.expr_floor {
            config.expression_floor = floor;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
    }
}

pub(crate) fn run(arg: &ExpressionArg) -> anyhow::Result<()> {
    let mut config = ExpressionConfig::load(arg.config.as_deref())?;
    arg.apply_overrides(&mut config);
    config.validate()?;

    let lister = GlobLister::new(config.file_pattern.as_str());
    let discovery = discover_samples(&lister, &arg.data_dir, &config.markers)
        .with_context(|| format!("Failed to discover samples in {}", arg.data_dir.display()))?;

    let mut aggregated: Vec<AggregatedGroup> = vec![];
    for group in &discovery.groups {
        if group.files.is_empty() {
            println!("No {} files found.", group.label);
            continue;
        }
        let replicates = load_replicates(&group.files, &config.schema);
        if replicates.is_empty() {
            println!("No {} files could be loaded.", group.label);
            continue;
        }
        let group = aggregate_replicates(&group.label, &replicates)?;
        let (rows, columns) = group.shape();
        println!("Aggregated {} sample shape: ({rows}, {columns})", group.label);
        aggregated.push(group);
    }

    let find_group = |label: &str| {
        aggregated
            .iter()
            .find(|g| g.label == label)
            .ok_or_else(|| ExpressionError::MissingGroup {
                label: label.to_owned(),
            })
    };
    let baseline = find_group(config.baseline.as_str())?;
    let treatment = find_group(config.treatment.as_str())?;

    let table = differential(baseline, treatment);
    let (rows, columns) = table.shape();
    println!(
        "Merged data shape ({} and {}): ({rows}, {columns})",
        table.baseline, table.treatment
    );
    report::print_preview(&table, 5);
    println!();

    let significant = significant_genes(&table, config.threshold);
    report::print_significant(&table, &significant, config.threshold);
    println!();

    let figure_writer = FigureWriter::new(arg.save_figures, &arg.output_dir);
    figures::render_fold_change_histogram(&figure_writer, &table, config.histogram_bins)?;

    let expressed = expression_filter(&table, config.expression_floor);
    println!(
        "Filtered data shape (removing low expression genes): ({}, 5)",
        expressed.len()
    );

    let labeled = label_regulation(&expressed, config.threshold);
    let summary = RegulationSummary::from_genes(&labeled);
    println!("Regulation summary: {summary}");
    println!();

    figures::render_scatter(&figure_writer, &table, &labeled)?;

    let top = top_genes_by_abs_fc(&labeled, config.top_n);
    report::print_top_genes(&table, &top, 10);
    figures::render_heatmap(&figure_writer, &table, &top, config.top_n)?;

    if let Some(path) = &arg.table_output {
        export::save_labeled_genes(path, &table, &labeled)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::Write as _, path::Path};

    use flate2::{Compression, write::GzEncoder};

    use super::*;

    fn write_gz(path: &Path, content: &str) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    fn arg(data_dir: &Path, out_dir: &Path) -> ExpressionArg {
        ExpressionArg {
            data_dir: data_dir.to_owned(),
            config: None,
            baseline: None,
            treatment: None,
            threshold: None,
            expr_floor: None,
            top_n: None,
            save_figures: true,
            output_dir: out_dir.join("figures"),
            table_output: Some(out_dir.join("genes.csv")),
        }
    }

    #[test]
    fn test_full_run_labels_genes() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_gz(
            &data.path().join("GSM1_MCF7_1.csv.gz"),
            "Gene_ID,Gene_Symbol,FPKM\nG1,TP53,10\nG2,ESR1,1\nG3,PGR,0.1\nG4,GAPDH,50\n",
        );
        write_gz(
            &data.path().join("GSM2_MCF7_2.csv.gz"),
            "Gene_ID,Gene_Symbol,FPKM\nG1,TP53,12\nG2,ESR1,3\nG3,PGR,0.3\nG4,GAPDH,50\n",
        );
        write_gz(
            &data.path().join("GSM3_PR_1.csv.gz"),
            "Gene_ID,Gene_Symbol,FPKM\nG1,TP53,100\nG2,ESR1,0\nG3,PGR,0.2\nG4,GAPDH,52\n",
        );

        run(&arg(data.path(), out.path())).unwrap();

        for name in [
            "logfc_histogram.svg",
            "expression_scatter.svg",
            "top_genes_heatmap.svg",
        ] {
            assert!(out.path().join("figures").join(name).is_file(), "{name}");
        }

        let mut reader = csv::Reader::from_path(out.path().join("genes.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            [
                "Gene_ID",
                "Gene_Symbol",
                "avg_MCF7_FPKM",
                "avg_PR_FPKM",
                "logFC",
                "Regulation"
            ]
        );
        let rows = reader
            .records()
            .map(|r| r.unwrap())
            .map(|r| (r[1].to_owned(), r[5].to_owned()))
            .collect::<Vec<_>>();
        // PGR is below the expression floor in both groups
        assert_eq!(
            rows,
            [
                ("TP53".to_owned(), "Upregulated".to_owned()),
                ("ESR1".to_owned(), "Not significant".to_owned()),
                ("GAPDH".to_owned(), "Not significant".to_owned()),
            ]
        );
    }

    #[test]
    fn test_missing_treatment_group_fails() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_gz(
            &data.path().join("GSM1_MCF7_1.csv.gz"),
            "Gene_ID,Gene_Symbol,FPKM\nG1,TP53,10\n",
        );

        let err = run(&arg(data.path(), out.path())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExpressionError>(),
            Some(ExpressionError::MissingGroup { label }) if label == "PR"
        ));
        assert!(!out.path().join("genes.csv").exists());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut arg = arg(Path::new("data"), Path::new("out"));
        arg.treatment = Some("DXR".to_owned());
        arg.threshold = Some(1.0);
        arg.expr_floor = Some(0.5);
        let mut config = ExpressionConfig::default();
        arg.apply_overrides(&mut config);
        assert_eq!(config.baseline, "MCF7");
        assert_eq!(config.treatment, "DXR");
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.expression_floor, 0.5);
        assert_eq!(config.top_n, 50);
    }
}
