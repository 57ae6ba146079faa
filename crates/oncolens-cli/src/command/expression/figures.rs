use oncolens_analysis::{differential::DifferentialTable, significance::LabeledGene};
use oncolens_stats::{histogram::Histogram, kde::GaussianKde};

use crate::plot::{
    Figure, FigureWriter, Labels,
    color::STEEL_BLUE,
    heatmap::{HeatmapData, draw_heatmap},
    histogram::draw_histogram,
    scatter::{ColoredPoint, draw_colored_scatter},
};

pub(super) fn render_fold_change_histogram(
    writer: &FigureWriter,
    table: &DifferentialTable,
    bins: usize,
) -> anyhow::Result<()> {
    let histogram = Histogram::new(table.fold_changes(), bins);
    let kde = GaussianKde::new(table.fold_changes());
    let title = format!(
        "Histogram of Log2 Fold Change ({} vs. {})",
        table.treatment, table.baseline
    );
    let labels = Labels {
        title: &title,
        x: "Log2 Fold Change",
        y: "Gene Count",
    };
    let figure = Figure::new(8.0, 6.0);
    writer.render("logfc_histogram.svg", figure, |area| {
        draw_histogram(area, figure, &labels, &histogram, kde.as_ref(), STEEL_BLUE)
    })
}

/// Treatment against baseline expression on the log scale, colored by fold change.
pub(super) fn render_scatter(
    writer: &FigureWriter,
    table: &DifferentialTable,
    genes: &[LabeledGene],
) -> anyhow::Result<()> {
    let points = genes
        .iter()
        .filter_map(|gene| {
            Some(ColoredPoint {
                x: gene.baseline_log_expression()?,
                y: gene.treatment_log_expression()?,
                value: gene.record.log2_fc?,
            })
        })
        .collect::<Vec<_>>();
    let title = format!(
        "Scatter Plot of Gene Expression ({} vs. {})",
        table.baseline, table.treatment
    );
    let x = format!("log2({} + 1)", table.baseline_column());
    let y = format!("log2({} + 1)", table.treatment_column());
    let labels = Labels {
        title: &title,
        x: &x,
        y: &y,
    };
    let figure = Figure::new(8.0, 6.0);
    writer.render("expression_scatter.svg", figure, |area| {
        draw_colored_scatter(area, figure, &labels, "logFC", &points)
    })
}

/// `log2(mean + 1)` of both groups, one row per gene.
fn heatmap_data(table: &DifferentialTable, top: &[&LabeledGene]) -> HeatmapData {
    HeatmapData {
        row_labels: top
            .iter()
            .map(|gene| gene.record.key.gene_symbol.clone())
            .collect(),
        column_labels: vec![table.baseline_column(), table.treatment_column()],
        values: top
            .iter()
            .map(|gene| {
                vec![
                    gene.baseline_log_expression(),
                    gene.treatment_log_expression(),
                ]
            })
            .collect(),
    }
}

pub(super) fn render_heatmap(
    writer: &FigureWriter,
    table: &DifferentialTable,
    top: &[&LabeledGene],
    top_n: usize,
) -> anyhow::Result<()> {
    let data = heatmap_data(table, top);
    let title = format!("Heatmap of Top {top_n} Differentially Expressed Genes");
    let labels = Labels {
        title: &title,
        x: "Condition",
        y: "Gene Symbol",
    };
    let figure = Figure::new(8.0, 10.0);
    writer.render("top_genes_heatmap.svg", figure, |area| {
        draw_heatmap(area, figure, &labels, &data)
    })
}

#[cfg(test)]
mod tests {
    use oncolens_analysis::{
        differential::DifferentialRecord, expression::GeneKey, significance::Regulation,
    };

    use super::*;

    #[test]
    fn test_heatmap_rows_follow_ranking() {
        let gene = |symbol: &str, a: f64, b: f64, fc: f64| LabeledGene {
            record: DifferentialRecord {
                key: GeneKey {
                    gene_id: format!("ID_{symbol}"),
                    gene_symbol: symbol.to_owned(),
                },
                baseline_mean: Some(a),
                treatment_mean: Some(b),
                log2_fc: Some(fc),
            },
            regulation: Regulation::classify(Some(fc), 2.0),
        };
        let table = DifferentialTable {
            baseline: "MCF7".to_owned(),
            treatment: "PR".to_owned(),
            records: vec![],
        };
        let genes = [gene("TP53", 1.0, 20.0, 3.4), gene("ESR1", 7.0, 3.0, -1.0)];
        let top = genes.iter().collect::<Vec<_>>();

        let data = heatmap_data(&table, &top);

        assert_eq!(data.row_labels, ["TP53", "ESR1"]);
        assert_eq!(data.column_labels, ["avg_MCF7_FPKM", "avg_PR_FPKM"]);
        assert_eq!(data.values[0][0], Some(1.0));
        assert_eq!(data.values[1], [Some(3.0), Some(2.0)]);
    }
}
