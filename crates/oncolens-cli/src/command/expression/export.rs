use std::path::Path;

use anyhow::Context;
use oncolens_analysis::{differential::DifferentialTable, significance::LabeledGene};

use crate::util;

/// Writes the expression-filtered genes with their regulation labels.
///
/// Missing numbers are written as empty fields.
pub(super) fn save_labeled_genes(
    path: &Path,
    table: &DifferentialTable,
    genes: &[LabeledGene],
) -> anyhow::Result<()> {
    util::create_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record([
        "Gene_ID".to_owned(),
        "Gene_Symbol".to_owned(),
        table.baseline_column(),
        table.treatment_column(),
        "logFC".to_owned(),
        "Regulation".to_owned(),
    ])?;
    let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    for gene in genes {
        let record = &gene.record;
        writer
            .write_record([
                record.key.gene_id.clone(),
                record.key.gene_symbol.clone(),
                number(record.baseline_mean),
                number(record.treatment_mean),
                number(record.log2_fc),
                gene.regulation.to_string(),
            ])
            .with_context(|| format!("Failed to write CSV row for gene {}", record.key))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    println!("Gene table saved to: {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use oncolens_analysis::{
        differential::DifferentialRecord, expression::GeneKey, significance::Regulation,
    };

    use super::*;

    #[test]
    fn test_missing_values_are_empty_fields() {
        let table = DifferentialTable {
            baseline: "MCF7".to_owned(),
            treatment: "DXR".to_owned(),
            records: vec![],
        };
        let genes = [LabeledGene {
            record: DifferentialRecord {
                key: GeneKey {
                    gene_id: "G1".to_owned(),
                    gene_symbol: "TP53".to_owned(),
                },
                baseline_mean: Some(2.5),
                treatment_mean: None,
                log2_fc: None,
            },
            regulation: Regulation::NotSignificant,
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.csv");

        save_labeled_genes(&path, &table, &genes).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Gene_ID,Gene_Symbol,avg_MCF7_FPKM,avg_DXR_FPKM,logFC,Regulation\n\
             G1,TP53,2.5,,,Not significant\n"
        );
    }
}
