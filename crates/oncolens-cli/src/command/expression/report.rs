use oncolens_analysis::{
    differential::{DifferentialRecord, DifferentialTable},
    significance::LabeledGene,
};

use crate::util::format_opt;

fn print_header(table: &DifferentialTable) {
    println!(
        "  {:<16} {:>16} {:>16} {:>10}",
        "Gene_Symbol",
        table.baseline_column(),
        table.treatment_column(),
        "logFC",
    );
    // symbol(16) + 2 * mean(16) + logFC(10) + spaces(3)
    println!("  {}", "-".repeat(61));
}

fn print_row(record: &DifferentialRecord) {
    println!(
        "  {:<16} {:>16} {:>16} {:>10}",
        record.key.gene_symbol,
        format_opt(record.baseline_mean, 3),
        format_opt(record.treatment_mean, 3),
        format_opt(record.log2_fc, 3),
    );
}

/// Print the first `n` merged genes
pub(super) fn print_preview(table: &DifferentialTable, n: usize) {
    print_header(table);
    for record in table.records.iter().take(n) {
        print_row(record);
    }
}

/// Print every gene whose fold change passes the threshold
pub(super) fn print_significant(
    table: &DifferentialTable,
    significant: &[&DifferentialRecord],
    threshold: f64,
) {
    println!("===== Significantly Altered Genes =====");
    println!(
        "{} of {} genes with |log2 fold change| > {threshold}",
        significant.len(),
        table.len()
    );
    if significant.is_empty() {
        return;
    }
    print_header(table);
    for record in significant {
        print_row(record);
    }
}

/// Print the strongest `n` of the top-ranked genes with their labels
pub(super) fn print_top_genes(table: &DifferentialTable, top: &[&LabeledGene], n: usize) {
    if top.is_empty() {
        return;
    }
    println!("Top genes by |log2 fold change|:");
    print_header(table);
    for gene in top.iter().take(n) {
        print_row(&gene.record);
    }
    println!();
}
