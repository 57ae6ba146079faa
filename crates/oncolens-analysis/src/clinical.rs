//! Clinical patient records: loading and cleaning
//!
//! Patient tables arrive as tab-separated text with `#` metadata lines. Cleaning
//! derives a binary event flag from the survival status, maps the metastasis
//! code to a display label, coerces the survival duration to a number and drops
//! records that lack any of the key fields.
//!
//! # Example
//!
//! ```
//! use oncolens_analysis::{
//!     clinical::{ClinicalSchema, clean_clinical},
//!     table::{LoadOptions, Table},
//! };
//!
//! let text = "\
//! #Patient data
//! PATIENT_ID\tOS_STATUS\tMETASTASIS\tOS_MONTHS
//! P1\t1:DECEASED\tM1\t12.0
//! P2\t0:LIVING\tM0\t40.5
//! P3\t0:LIVING\tM0\tunknown
//! ";
//! let table = Table::from_reader(text.as_bytes(), &LoadOptions::tsv_with_comments()).unwrap();
//! let cleaned = clean_clinical(&table, &ClinicalSchema::default()).unwrap();
//!
//! let records = cleaned.records();
//! assert_eq!(records.len(), 2);
//! assert!(records[0].event);
//! assert!(!records[1].event);
//! ```

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::table::{LoadOptions, Table, TableError, coerce_numeric};

/// Status text marking an observed death.
pub const DECEASED_MARKER: &str = "DECEASED";

/// Metastasis display labels, looked up from the clinical `M0`/`M1` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MetastasisLabel {
    #[display("No Metastasis")]
    NoMetastasis,
    #[display("Metastasis")]
    Metastasis,
}

impl MetastasisLabel {
    /// Maps a raw metastasis code. Codes other than `M0` and `M1` have no label.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M0" => Some(Self::NoMetastasis),
            "M1" => Some(Self::Metastasis),
            _ => None,
        }
    }

    fn from_display(label: &str) -> Option<Self> {
        [Self::NoMetastasis, Self::Metastasis]
            .into_iter()
            .find(|l| l.to_string() == label)
    }
}

/// Column names of a clinical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalSchema {
    /// Survival status column (e.g. `1:DECEASED`, `0:LIVING`).
    pub status_column: String,
    /// Metastasis code column (`M0`, `M1`, ...).
    pub metastasis_column: String,
    /// Survival duration in months.
    pub duration_column: String,
    /// Derived binary event flag column.
    pub event_column: String,
    /// Derived metastasis label column.
    pub label_column: String,
    /// Substring of the upper-cased status that marks an event.
    pub deceased_marker: String,
}

impl Default for ClinicalSchema {
    fn default() -> Self {
        Self {
            status_column: "OS_STATUS".to_owned(),
            metastasis_column: "METASTASIS".to_owned(),
            duration_column: "OS_MONTHS".to_owned(),
            event_column: "OS_EVENT".to_owned(),
            label_column: "METASTASIS_LABEL".to_owned(),
            deceased_marker: DECEASED_MARKER.to_owned(),
        }
    }
}

impl ClinicalSchema {
    /// Whether `status` denotes an observed event.
    ///
    /// A case-insensitive substring match: any status text containing the marker counts.
    /// A missing status reads as `NAN` and is therefore censored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_analysis::clinical::ClinicalSchema;
    /// let schema = ClinicalSchema::default();
    /// assert!(schema.is_event(Some("1:DECEASED")));
    /// assert!(schema.is_event(Some("deceased (tumor)")));
    /// assert!(!schema.is_event(Some("0:LIVING")));
    /// assert!(!schema.is_event(None));
    /// ```
    #[must_use]
    pub fn is_event(&self, status: Option<&str>) -> bool {
        status
            .unwrap_or("nan")
            .to_uppercase()
            .contains(&self.deceased_marker.to_uppercase())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CleaningError {
    #[display("clinical table has no '{column}' column")]
    MissingColumn { column: String },
    #[display("failed to update clinical table: {source}")]
    Table { source: TableError },
}

/// One cleaned patient record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalRecord {
    /// Raw survival status text.
    pub status: Option<String>,
    /// `true` if the event (death) was observed, `false` if censored.
    pub event: bool,
    /// Raw metastasis code.
    pub metastasis_code: String,
    /// Display label, `None` for codes outside the known set.
    pub label: Option<MetastasisLabel>,
    /// Overall survival in months.
    pub months: f64,
}

/// Output of [`clean_clinical`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedClinical {
    /// The cleaned table with derived columns added.
    pub table: Table,
    /// Missing-value count per column of the cleaned table.
    pub missing_counts: Vec<(String, usize)>,
    schema: ClinicalSchema,
}

impl CleanedClinical {
    /// Typed view of the cleaned rows, in table order.
    #[must_use]
    pub fn records(&self) -> Vec<ClinicalRecord> {
        let (Some(status), Some(code), Some(months), Some(event), Some(label)) = (
            self.table.column_index(&self.schema.status_column),
            self.table.column_index(&self.schema.metastasis_column),
            self.table.column_index(&self.schema.duration_column),
            self.table.column_index(&self.schema.event_column),
            self.table.column_index(&self.schema.label_column),
        ) else {
            return vec![];
        };

        self.table
            .rows()
            .filter_map(|row| {
                Some(ClinicalRecord {
                    status: row[status].clone(),
                    event: row[event].as_deref()? == "1",
                    metastasis_code: row[code].clone()?,
                    label: row[label].as_deref().and_then(MetastasisLabel::from_display),
                    months: coerce_numeric(row[months].as_deref())?,
                })
            })
            .collect()
    }

    /// Survival durations of every cleaned record.
    #[must_use]
    pub fn durations(&self) -> Vec<f64> {
        self.records().iter().map(|r| r.months).collect()
    }

    /// Durations grouped by metastasis label in order of first appearance.
    ///
    /// Records without a label are left out.
    #[must_use]
    pub fn durations_by_label(&self) -> Vec<(MetastasisLabel, Vec<f64>)> {
        group_by_first_seen(
            self.records()
                .into_iter()
                .filter_map(|r| r.label.map(|label| (label, r.months))),
        )
    }
}

/// Groups `(key, value)` pairs, keeping keys in order of first appearance.
pub(crate) fn group_by_first_seen<K, V, I>(items: I) -> Vec<(K, Vec<V>)>
where
    K: PartialEq,
    I: IntoIterator<Item = (K, V)>,
{
    let mut groups: Vec<(K, Vec<V>)> = vec![];
    for (key, value) in items {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key, vec![value])),
        }
    }
    groups
}

/// Reads a clinical table, propagating failures.
pub fn try_load_clinical_table(path: &Path, options: &LoadOptions) -> Result<Table, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io { source })?;
    Table::from_reader(BufReader::new(file), options)
}

/// Reads a clinical table, recovering from any failure with an empty table.
///
/// The failure cause is reported as a warning.
#[must_use]
pub fn load_clinical_table(path: &Path, options: &LoadOptions) -> Table {
    match try_load_clinical_table(path, options) {
        Ok(table) => {
            tracing::info!(
                path = %path.display(),
                rows = table.num_rows(),
                columns = table.num_columns(),
                "Clinical data loaded successfully."
            );
            table
        }
        Err(err) => {
            tracing::warn!("Error loading clinical data: {err}");
            Table::empty()
        }
    }
}

/// Cleans a clinical table.
///
/// Steps, in order:
///
/// 1. event flag: `1` if the upper-cased status contains the deceased marker, else `0`
/// 2. metastasis label from the two-entry code lookup; other codes become missing
/// 3. survival duration coerced to a number; unparseable values become missing
/// 4. rows missing the duration, the event flag or the *raw* metastasis code are dropped
///
/// Rows whose code is present but unmapped survive step 4 with a missing label.
/// The raw status column is left untouched, so cleaning an already cleaned table
/// yields the same table.
pub fn clean_clinical(
    table: &Table,
    schema: &ClinicalSchema,
) -> Result<CleanedClinical, CleaningError> {
    let require = |column: &str| {
        table
            .column_index(column)
            .ok_or_else(|| CleaningError::MissingColumn {
                column: column.to_owned(),
            })
    };
    let status_idx = require(&schema.status_column)?;
    let code_idx = require(&schema.metastasis_column)?;
    let duration_idx = require(&schema.duration_column)?;

    let events = table
        .column_values(status_idx)
        .map(|status| Some(if schema.is_event(status) { "1" } else { "0" }.to_owned()))
        .collect();
    let labels = table
        .column_values(code_idx)
        .map(|code| {
            code.and_then(MetastasisLabel::from_code)
                .map(|label| label.to_string())
        })
        .collect();
    let durations = table
        .column_values(duration_idx)
        .map(|value| coerce_numeric(value).map(|v| v.to_string()))
        .collect();

    let mut cleaned = table.clone();
    for (column, values) in [
        (&schema.event_column, events),
        (&schema.label_column, labels),
        (&schema.duration_column, durations),
    ] {
        cleaned
            .set_column(column, values)
            .map_err(|source| CleaningError::Table { source })?;
    }

    let event_idx = cleaned
        .column_index(&schema.event_column)
        .ok_or_else(|| CleaningError::MissingColumn {
            column: schema.event_column.clone(),
        })?;
    let before = cleaned.num_rows();
    cleaned.retain_rows(|row| {
        row[duration_idx].is_some() && row[event_idx].is_some() && row[code_idx].is_some()
    });
    tracing::debug!(
        dropped = before - cleaned.num_rows(),
        retained = cleaned.num_rows(),
        "dropped clinical rows missing key fields"
    );

    let missing_counts = cleaned.missing_counts();
    Ok(CleanedClinical {
        table: cleaned,
        missing_counts,
        schema: schema.clone(),
    })
}
