//! Per-sample expression tables and replicate aggregation
//!
//! Each sample file holds one row per gene: a gene identifier, a gene symbol and
//! an FPKM value. Replicates of one group are inner-joined on
//! `(gene id, gene symbol)`, so a gene missing from any replicate is dropped from
//! the group, and averaged per gene.
//!
//! # Example
//!
//! ```
//! use oncolens_analysis::expression::{ExpressionSchema, ReplicateTable, aggregate_replicates};
//! use oncolens_analysis::table::{LoadOptions, Table};
//!
//! let schema = ExpressionSchema::default();
//! let rep = |text: &str| {
//!     let table = Table::from_reader(text.as_bytes(), &LoadOptions::csv()).unwrap();
//!     ReplicateTable::from_table(&table, &schema, "inline").unwrap()
//! };
//! let replicates = [
//!     rep("Gene_ID,Gene_Symbol,FPKM\nENSG1,TP53,10\nENSG2,BRCA1,1\n"),
//!     rep("Gene_ID,Gene_Symbol,FPKM\nENSG1,TP53,20\n"),
//! ];
//!
//! let group = aggregate_replicates("MCF7", &replicates).unwrap();
//! assert_eq!(group.replicate_columns, ["MCF7_1_FPKM", "MCF7_2_FPKM"]);
//! assert_eq!(group.genes.len(), 1);
//! assert_eq!(group.genes[0].mean, Some(15.0));
//! ```

use std::{
    collections::{HashMap, HashSet},
    fmt,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use oncolens_stats::descriptive::mean_of_present;
use serde::{Deserialize, Serialize};

use crate::table::{LoadOptions, Table, TableError, coerce_numeric};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ExpressionError {
    #[display("failed to list sample directory {}: {source}", dir.display())]
    Listing {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("failed to parse {}: {source}", path.display())]
    Table { path: PathBuf, source: TableError },
    #[display("{} has {found} columns, expected at least 3 (gene id, gene symbol, expression)", path.display())]
    TooFewColumns { path: PathBuf, found: usize },
    #[display("{} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[display("no replicates to aggregate for group {label}")]
    EmptyGroup { label: String },
    #[display("group {label} has no aggregated expression data")]
    MissingGroup { label: String },
}

/// Column layout of a per-sample expression file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionSchema {
    pub gene_id_column: String,
    pub gene_symbol_column: String,
    /// Expression value column; when unset, the third column by position.
    pub value_column: Option<String>,
}

impl Default for ExpressionSchema {
    fn default() -> Self {
        Self {
            gene_id_column: "Gene_ID".to_owned(),
            gene_symbol_column: "Gene_Symbol".to_owned(),
            value_column: None,
        }
    }
}

/// Join key of an expression row. Missing cells are kept as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneKey {
    pub gene_id: String,
    pub gene_symbol: String,
}

impl fmt::Display for GeneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.gene_symbol, self.gene_id)
    }
}

/// Raw expression values of a single sample file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateTable {
    pub source: PathBuf,
    /// Name of the column the values were read from.
    pub value_column: String,
    pub rows: Vec<(GeneKey, Option<String>)>,
}

impl ReplicateTable {
    /// Extracts gene keys and expression values from a loaded table.
    pub fn from_table(
        table: &Table,
        schema: &ExpressionSchema,
        source: impl Into<PathBuf>,
    ) -> Result<Self, ExpressionError> {
        let path = source.into();
        let require = |column: &str| {
            table
                .column_index(column)
                .ok_or_else(|| ExpressionError::MissingColumn {
                    path: path.clone(),
                    column: column.to_owned(),
                })
        };

        let value_idx = match &schema.value_column {
            Some(column) => require(column)?,
            None if table.num_columns() < 3 => {
                return Err(ExpressionError::TooFewColumns {
                    path,
                    found: table.num_columns(),
                });
            }
            None => 2,
        };
        let id_idx = require(&schema.gene_id_column)?;
        let symbol_idx = require(&schema.gene_symbol_column)?;

        let rows = table
            .rows()
            .map(|row| {
                let key = GeneKey {
                    gene_id: row[id_idx].clone().unwrap_or_default(),
                    gene_symbol: row[symbol_idx].clone().unwrap_or_default(),
                };
                (key, row[value_idx].clone())
            })
            .collect();

        Ok(Self {
            value_column: table.columns()[value_idx].clone(),
            source: path,
            rows,
        })
    }

    /// Loads a gzip-compressed CSV sample file.
    pub fn load(path: &Path, schema: &ExpressionSchema) -> Result<Self, ExpressionError> {
        let file = File::open(path).map_err(|source| ExpressionError::Open {
            path: path.to_owned(),
            source,
        })?;
        let reader = BufReader::new(GzDecoder::new(file));
        let table =
            Table::from_reader(reader, &LoadOptions::csv()).map_err(|source| {
                ExpressionError::Table {
                    path: path.to_owned(),
                    source,
                }
            })?;
        Self::from_table(&table, schema, path)
    }
}

/// Loads every file of a group, skipping files that fail to load.
///
/// Failures are reported as warnings.
#[must_use]
pub fn load_replicates(files: &[PathBuf], schema: &ExpressionSchema) -> Vec<ReplicateTable> {
    files
        .iter()
        .filter_map(|path| match ReplicateTable::load(path, schema) {
            Ok(table) => {
                tracing::debug!(path = %path.display(), genes = table.rows.len(), "loaded sample");
                Some(table)
            }
            Err(err) => {
                let name = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                tracing::warn!("Error loading {name}: {err}");
                None
            }
        })
        .collect()
}

/// Mean expression of one gene within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedGene {
    pub key: GeneKey,
    /// Replicate values after numeric coercion, in replicate order.
    pub values: Vec<Option<f64>>,
    /// Mean over the present values; missing when every replicate is missing.
    pub mean: Option<f64>,
}

/// Replicate-averaged expression of one sample group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedGroup {
    pub label: String,
    /// `{label}_{n}_FPKM` for replicate `n`, 1-based.
    pub replicate_columns: Vec<String>,
    /// Genes present in every replicate, in the order of the first replicate.
    pub genes: Vec<AggregatedGene>,
}

impl AggregatedGroup {
    /// Name of the group-average column.
    #[must_use]
    pub fn average_column(&self) -> String {
        average_column(&self.label)
    }

    /// `(rows, columns)` of the `(gene id, gene symbol, average)` table.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.genes.len(), 3)
    }
}

/// `avg_{label}_FPKM`
#[must_use]
pub fn average_column(label: &str) -> String {
    format!("avg_{label}_FPKM")
}

/// Averages the replicates of one group.
///
/// Replicates are inner-joined on `(gene id, gene symbol)`; within a replicate the
/// first row of a duplicated key wins. Values are coerced to numbers (unparseable
/// values become missing) and averaged per gene ignoring missing values.
///
/// An empty replicate list is an error: callers skip groups without files.
pub fn aggregate_replicates(
    label: &str,
    replicates: &[ReplicateTable],
) -> Result<AggregatedGroup, ExpressionError> {
    let Some((first, rest)) = replicates.split_first() else {
        return Err(ExpressionError::EmptyGroup {
            label: label.to_owned(),
        });
    };

    let replicate_columns = (1..=replicates.len())
        .map(|n| format!("{label}_{n}_FPKM"))
        .collect::<Vec<_>>();

    let mut genes = vec![];
    let mut seen = HashSet::new();
    for (key, value) in &first.rows {
        if seen.insert(key) {
            genes.push((key.clone(), vec![coerce_numeric(value.as_deref())]));
        }
    }
    log_duplicates(first, seen.len());

    for replicate in rest {
        let mut values = HashMap::new();
        for (key, value) in &replicate.rows {
            values.entry(key).or_insert(value);
        }
        log_duplicates(replicate, values.len());
        genes.retain_mut(|(key, row)| match values.get(&*key) {
            Some(value) => {
                row.push(coerce_numeric(value.as_deref()));
                true
            }
            None => false,
        });
    }

    let genes = genes
        .into_iter()
        .map(|(key, values)| AggregatedGene {
            mean: mean_of_present(values.iter().copied()),
            key,
            values,
        })
        .collect();

    Ok(AggregatedGroup {
        label: label.to_owned(),
        replicate_columns,
        genes,
    })
}

fn log_duplicates(replicate: &ReplicateTable, unique: usize) {
    let duplicates = replicate.rows.len() - unique;
    if duplicates > 0 {
        tracing::debug!(
            path = %replicate.source.display(),
            duplicates,
            "ignored duplicated gene rows"
        );
    }
}
