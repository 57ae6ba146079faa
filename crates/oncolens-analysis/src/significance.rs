//! Fold-change significance, expression filtering and regulation labels
//!
//! Two independent selections are made from a [`DifferentialTable`]:
//!
//! - [`significant_genes`]: genes whose |log2 fold change| exceeds the threshold.
//!   This is a report only.
//! - [`expression_filter`] followed by [`label_regulation`]: genes expressed above
//!   a floor in either group, each labeled up/down/not significant against the
//!   same threshold. This population feeds the plots and the exported table.

use std::fmt;

use crate::differential::{DifferentialRecord, DifferentialTable};

pub const DEFAULT_FC_THRESHOLD: f64 = 2.0;
pub const DEFAULT_EXPRESSION_FLOOR: f64 = 1.0;
pub const DEFAULT_TOP_N: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Regulation {
    #[display("Upregulated")]
    Upregulated,
    #[display("Downregulated")]
    Downregulated,
    #[display("Not significant")]
    NotSignificant,
}

impl Regulation {
    pub const ALL: [Self; 3] = [Self::Upregulated, Self::Downregulated, Self::NotSignificant];

    /// Labels a fold change against `threshold`; a missing fold change is not significant.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_analysis::significance::Regulation;
    /// assert_eq!(Regulation::classify(Some(2.5), 2.0), Regulation::Upregulated);
    /// assert_eq!(Regulation::classify(Some(-2.0), 2.0), Regulation::NotSignificant);
    /// assert_eq!(Regulation::classify(None, 2.0), Regulation::NotSignificant);
    /// ```
    #[must_use]
    pub fn classify(log2_fc: Option<f64>, threshold: f64) -> Self {
        match log2_fc {
            Some(fc) if fc > threshold => Self::Upregulated,
            Some(fc) if fc < -threshold => Self::Downregulated,
            _ => Self::NotSignificant,
        }
    }
}

/// Genes with `|log2 fold change| > threshold`, in table order.
#[must_use]
pub fn significant_genes(table: &DifferentialTable, threshold: f64) -> Vec<&DifferentialRecord> {
    table
        .records
        .iter()
        .filter(|r| r.log2_fc.is_some_and(|fc| fc.abs() > threshold))
        .collect()
}

/// Genes whose mean expression exceeds `floor` in at least one of the two groups.
#[must_use]
pub fn expression_filter(table: &DifferentialTable, floor: f64) -> Vec<&DifferentialRecord> {
    let above = |mean: Option<f64>| mean.is_some_and(|v| v > floor);
    table
        .records
        .iter()
        .filter(|r| above(r.baseline_mean) || above(r.treatment_mean))
        .collect()
}

/// A gene with its regulation label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGene {
    pub record: DifferentialRecord,
    pub regulation: Regulation,
}

impl LabeledGene {
    /// `log2(mean + 1)` of the baseline group.
    #[must_use]
    pub fn baseline_log_expression(&self) -> Option<f64> {
        self.record.baseline_mean.map(|v| (v + 1.0).log2())
    }

    /// `log2(mean + 1)` of the treatment group.
    #[must_use]
    pub fn treatment_log_expression(&self) -> Option<f64> {
        self.record.treatment_mean.map(|v| (v + 1.0).log2())
    }
}

#[must_use]
pub fn label_regulation(records: &[&DifferentialRecord], threshold: f64) -> Vec<LabeledGene> {
    records
        .iter()
        .map(|&record| LabeledGene {
            record: record.clone(),
            regulation: Regulation::classify(record.log2_fc, threshold),
        })
        .collect()
}

/// The `n` genes with the largest |log2 fold change|.
///
/// Ties keep their input order; genes without a fold change sort last.
#[must_use]
pub fn top_genes_by_abs_fc(genes: &[LabeledGene], n: usize) -> Vec<&LabeledGene> {
    let mut sorted = genes.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        let key = |g: &LabeledGene| g.record.log2_fc.map(f64::abs);
        match (key(a), key(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    sorted.truncate(n);
    sorted
}

/// Number of genes per regulation label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegulationSummary {
    pub upregulated: usize,
    pub downregulated: usize,
    pub not_significant: usize,
}

impl RegulationSummary {
    #[must_use]
    pub fn from_genes(genes: &[LabeledGene]) -> Self {
        let mut summary = Self::default();
        for gene in genes {
            *summary.count_mut(gene.regulation) += 1;
        }
        summary
    }

    #[must_use]
    pub fn count(&self, regulation: Regulation) -> usize {
        match regulation {
            Regulation::Upregulated => self.upregulated,
            Regulation::Downregulated => self.downregulated,
            Regulation::NotSignificant => self.not_significant,
        }
    }

    fn count_mut(&mut self, regulation: Regulation) -> &mut usize {
        match regulation {
            Regulation::Upregulated => &mut self.upregulated,
            Regulation::Downregulated => &mut self.downregulated,
            Regulation::NotSignificant => &mut self.not_significant,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.upregulated + self.downregulated + self.not_significant
    }
}

impl fmt::Display for RegulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, regulation) in Regulation::ALL.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{regulation}: {}", self.count(regulation))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::GeneKey;

    fn record(id: &str, a: Option<f64>, b: Option<f64>, fc: Option<f64>) -> DifferentialRecord {
        DifferentialRecord {
            key: GeneKey {
                gene_id: id.to_owned(),
                gene_symbol: id.to_lowercase(),
            },
            baseline_mean: a,
            treatment_mean: b,
            log2_fc: fc,
        }
    }

    fn table(records: Vec<DifferentialRecord>) -> DifferentialTable {
        DifferentialTable {
            baseline: "MCF7".to_owned(),
            treatment: "PR".to_owned(),
            records,
        }
    }

    fn ids<'a>(records: impl IntoIterator<Item = &'a DifferentialRecord>) -> Vec<&'a str> {
        records.into_iter().map(|r| r.key.gene_id.as_str()).collect()
    }

    #[test]
    fn test_expression_filter_is_either_group() {
        let t = table(vec![
            record("KEEP", Some(5.0), Some(0.0), Some(-2.58)),
            record("DROP", Some(0.0), Some(0.0), Some(0.0)),
            record("EDGE", Some(1.0), Some(1.0), Some(0.0)),
            record("HALF", None, Some(3.0), None),
        ]);
        let kept = expression_filter(&t, DEFAULT_EXPRESSION_FLOOR);
        assert_eq!(ids(kept), ["KEEP", "HALF"]);
    }

    #[test]
    fn test_significance_uses_strict_threshold() {
        let t = table(vec![
            record("UP", Some(1.0), Some(100.0), Some(5.67)),
            record("EQ", Some(1.0), Some(1.0), Some(-2.0)),
            record("DOWN", Some(100.0), Some(1.0), Some(-5.67)),
            record("NA", None, Some(1.0), None),
        ]);
        assert_eq!(ids(significant_genes(&t, 2.0)), ["UP", "DOWN"]);
    }

    #[test]
    fn test_labeled_population_differs_from_significant_report() {
        // Significant but expressed below the floor in both groups
        let t = table(vec![
            record("LOW", Some(0.0), Some(0.9), Some(2.5)),
            record("HIGH", Some(10.0), Some(12.0), Some(0.24)),
        ]);
        assert_eq!(ids(significant_genes(&t, 0.5)), ["LOW"]);

        let labeled = label_regulation(&expression_filter(&t, 1.0), 0.5);
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].record.key.gene_id, "HIGH");
        assert_eq!(labeled[0].regulation, Regulation::NotSignificant);
    }

    #[test]
    fn test_classify_scenario() {
        let fc = 6.0_f64.log2() - 16.0_f64.log2();
        assert_eq!(
            Regulation::classify(Some(fc), DEFAULT_FC_THRESHOLD),
            Regulation::NotSignificant
        );
        assert_eq!(Regulation::classify(Some(-2.1), 2.0), Regulation::Downregulated);
        assert_eq!(Regulation::NotSignificant.to_string(), "Not significant");
    }

    #[test]
    fn test_replicates_to_regulation_label() {
        use crate::{
            differential::differential,
            expression::{ExpressionSchema, ReplicateTable, aggregate_replicates},
            table::{LoadOptions, Table},
        };

        let replicate = |name: &str, value: &str| {
            let text = format!("Gene_ID,Gene_Symbol,FPKM\nG1,TP53,{value}\n");
            let table = Table::from_reader(text.as_bytes(), &LoadOptions::csv()).unwrap();
            ReplicateTable::from_table(&table, &ExpressionSchema::default(), name).unwrap()
        };
        let mcf7 = aggregate_replicates(
            "MCF7",
            &[replicate("MCF7_1.csv.gz", "10"), replicate("MCF7_2.csv.gz", "20")],
        )
        .unwrap();
        let pr = aggregate_replicates("PR", &[replicate("PR_1.csv.gz", "5")]).unwrap();

        let merged = differential(&mcf7, &pr);
        let labeled = label_regulation(
            &expression_filter(&merged, DEFAULT_EXPRESSION_FLOOR),
            DEFAULT_FC_THRESHOLD,
        );

        assert_eq!(labeled.len(), 1);
        let gene = &labeled[0];
        assert_eq!(gene.record.baseline_mean, Some(15.0));
        assert_eq!(gene.record.treatment_mean, Some(5.0));
        let fc = gene.record.log2_fc.unwrap();
        assert!((fc - (-1.415)).abs() < 1e-3, "{fc}");
        assert_eq!(gene.regulation, Regulation::NotSignificant);
        assert_eq!(gene.regulation.to_string(), "Not significant");
    }

    #[test]
    fn test_top_genes_stable_and_missing_last() {
        let t = table(vec![
            record("A", Some(2.0), Some(2.0), Some(1.0)),
            record("B", Some(2.0), Some(2.0), None),
            record("C", Some(2.0), Some(2.0), Some(-3.0)),
            record("D", Some(2.0), Some(2.0), Some(-1.0)),
            record("E", Some(2.0), Some(2.0), Some(3.0)),
        ]);
        let labeled = label_regulation(&t.records.iter().collect::<Vec<_>>(), 2.0);

        let top = top_genes_by_abs_fc(&labeled, 10);
        let order = top
            .iter()
            .map(|g| g.record.key.gene_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["C", "E", "A", "D", "B"]);

        assert_eq!(top_genes_by_abs_fc(&labeled, 2).len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let t = table(vec![
            record("A", Some(1.0), Some(50.0), Some(5.0)),
            record("B", Some(50.0), Some(1.0), Some(-5.0)),
            record("C", Some(3.0), Some(3.0), Some(0.0)),
            record("D", Some(3.0), Some(3.0), None),
        ]);
        let labeled = label_regulation(&t.records.iter().collect::<Vec<_>>(), 2.0);
        let summary = RegulationSummary::from_genes(&labeled);
        assert_eq!(summary.upregulated, 1);
        assert_eq!(summary.downregulated, 1);
        assert_eq!(summary.not_significant, 2);
        assert_eq!(summary.total(), 4);
        assert_eq!(
            summary.to_string(),
            "Upregulated: 1, Downregulated: 1, Not significant: 2"
        );
    }

    #[test]
    fn test_log_expression() {
        let gene = LabeledGene {
            record: record("A", Some(3.0), Some(0.0), None),
            regulation: Regulation::NotSignificant,
        };
        assert!((gene.baseline_log_expression().unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(gene.treatment_log_expression(), Some(0.0));
    }
}
