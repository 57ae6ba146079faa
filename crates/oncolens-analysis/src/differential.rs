//! Log2 fold change between two aggregated groups

use std::collections::HashMap;

use crate::expression::{AggregatedGroup, GeneKey, average_column};

/// Pseudo-count added before taking logarithms.
pub const PSEUDO_COUNT: f64 = 1.0;

/// `log2(treatment + 1) - log2(baseline + 1)`
///
/// # Examples
///
/// ```
/// # use oncolens_analysis::differential::log2_fold_change;
/// assert_eq!(log2_fold_change(3.0, 7.0), 1.0);
/// assert_eq!(log2_fold_change(0.0, 0.0), 0.0);
/// ```
#[must_use]
pub fn log2_fold_change(baseline: f64, treatment: f64) -> f64 {
    (treatment + PSEUDO_COUNT).log2() - (baseline + PSEUDO_COUNT).log2()
}

/// One gene present in both groups.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialRecord {
    pub key: GeneKey,
    pub baseline_mean: Option<f64>,
    pub treatment_mean: Option<f64>,
    /// Missing when either mean is missing or the logarithm is undefined.
    pub log2_fc: Option<f64>,
}

/// Merged comparison of a treatment group against a baseline group.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialTable {
    pub baseline: String,
    pub treatment: String,
    /// Genes in both groups, in baseline order.
    pub records: Vec<DifferentialRecord>,
}

impl DifferentialTable {
    #[must_use]
    pub fn baseline_column(&self) -> String {
        average_column(&self.baseline)
    }

    #[must_use]
    pub fn treatment_column(&self) -> String {
        average_column(&self.treatment)
    }

    /// `(rows, columns)` of the merged `(gene id, gene symbol, baseline, treatment)` table,
    /// before the fold-change column is added.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), 4)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold changes that are present, in record order.
    pub fn fold_changes(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(|r| r.log2_fc)
    }
}

/// Inner-joins two groups on the gene key and computes the log2 fold change of
/// `treatment` relative to `baseline`.
#[must_use]
pub fn differential(baseline: &AggregatedGroup, treatment: &AggregatedGroup) -> DifferentialTable {
    let mut treatment_means = HashMap::new();
    for gene in &treatment.genes {
        treatment_means.entry(&gene.key).or_insert(gene.mean);
    }

    let records = baseline
        .genes
        .iter()
        .filter_map(|gene| {
            let treatment_mean = *treatment_means.get(&gene.key)?;
            let log2_fc = gene
                .mean
                .zip(treatment_mean)
                .map(|(a, b)| log2_fold_change(a, b))
                .filter(|fc| !fc.is_nan());
            Some(DifferentialRecord {
                key: gene.key.clone(),
                baseline_mean: gene.mean,
                treatment_mean,
                log2_fc,
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        baseline = %baseline.label,
        treatment = %treatment.label,
        genes = records.len(),
        "merged groups"
    );

    DifferentialTable {
        baseline: baseline.label.clone(),
        treatment: treatment.label.clone(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::AggregatedGene;

    fn group(label: &str, genes: &[(&str, Option<f64>)]) -> AggregatedGroup {
        AggregatedGroup {
            label: label.to_owned(),
            replicate_columns: vec![format!("{label}_1_FPKM")],
            genes: genes
                .iter()
                .map(|&(id, mean)| AggregatedGene {
                    key: GeneKey {
                        gene_id: id.to_owned(),
                        gene_symbol: format!("SYM_{id}"),
                    },
                    values: vec![mean],
                    mean,
                })
                .collect(),
        }
    }

    #[test]
    fn test_fold_change_of_averaged_groups() {
        let mcf7 = group("MCF7", &[("G1", Some(15.0))]);
        let pr = group("PR", &[("G1", Some(5.0))]);
        let table = differential(&mcf7, &pr);
        let fc = table.records[0].log2_fc.unwrap();
        assert!((fc - (6.0_f64.log2() - 16.0_f64.log2())).abs() < 1e-12);
        assert!((fc + 1.415_037_5).abs() < 1e-6);
        assert_eq!(table.baseline_column(), "avg_MCF7_FPKM");
        assert_eq!(table.treatment_column(), "avg_PR_FPKM");
    }

    #[test]
    fn test_swapping_groups_negates_fold_change() {
        let a = group("A", &[("G1", Some(0.0)), ("G2", Some(123.4)), ("G3", Some(8.0))]);
        let b = group("B", &[("G3", Some(2.5)), ("G1", Some(40.0)), ("G2", Some(1.0))]);
        let forward = differential(&a, &b);
        let backward = differential(&b, &a);
        for record in &forward.records {
            let reverse = backward
                .records
                .iter()
                .find(|r| r.key == record.key)
                .unwrap();
            assert!((record.log2_fc.unwrap() + reverse.log2_fc.unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inner_join_in_baseline_order() {
        let a = group("A", &[("G2", Some(1.0)), ("G1", Some(1.0)), ("G9", Some(1.0))]);
        let b = group("B", &[("G1", Some(1.0)), ("G2", Some(1.0))]);
        let table = differential(&a, &b);
        let ids = table
            .records
            .iter()
            .map(|r| r.key.gene_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["G2", "G1"]);
        assert_eq!(table.shape(), (2, 4));
    }

    #[test]
    fn test_missing_mean_propagates() {
        let a = group("A", &[("G1", None), ("G2", Some(-3.0))]);
        let b = group("B", &[("G1", Some(4.0)), ("G2", Some(1.0))]);
        let table = differential(&a, &b);
        assert_eq!(table.records[0].log2_fc, None);
        // log2 of a negative number is NaN
        assert_eq!(table.records[1].log2_fc, None);
        assert_eq!(table.fold_changes().count(), 0);
    }
}
