//! Delimited text tables with missing-value semantics
//!
//! A [`Table`] is an ordered list of column names plus rows of optional string
//! cells. Cells are kept as text; numeric coercion happens in the stages that
//! need it, so an unparseable value turns into a missing one there rather than
//! failing the load.
//!
//! Cells spelled like one of [`MISSING_MARKERS`] (including the empty string)
//! are read as missing.

use std::{fmt, io::Read};

use serde::{Deserialize, Serialize};

/// Cell spellings treated as a missing value on load.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Text used when a missing cell is displayed.
pub const MISSING_DISPLAY: &str = "NaN";

#[must_use]
pub fn is_missing_marker(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Parses a cell as a number, treating unparseable text and NaN as missing.
///
/// # Examples
///
/// ```
/// # use oncolens_analysis::table::coerce_numeric;
/// assert_eq!(coerce_numeric(Some(" 12.5 ")), Some(12.5));
/// assert_eq!(coerce_numeric(Some("twelve")), None);
/// assert_eq!(coerce_numeric(None), None);
/// ```
#[must_use]
pub fn coerce_numeric(cell: Option<&str>) -> Option<f64> {
    cell?.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("failed to read table: {source}")]
    Io { source: std::io::Error },
    #[display("failed to parse table: {source}")]
    Csv { source: csv::Error },
    #[display("{option} must be a single ASCII character, got '{found}'")]
    NonAsciiOption { option: &'static str, found: char },
    #[display("no columns to parse from input")]
    NoColumns,
    #[display("expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[display("column '{column}' not found")]
    MissingColumn { column: String },
    #[display("column '{column}' has {found} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// How a delimited file is split into rows and fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field delimiter.
    pub delimiter: char,
    /// Lines starting with this character are skipped as metadata.
    pub comment: Option<char>,
}

impl LoadOptions {
    /// Tab-separated with `#` metadata lines.
    #[must_use]
    pub fn tsv_with_comments() -> Self {
        Self {
            delimiter: '\t',
            comment: Some('#'),
        }
    }

    /// Plain comma-separated values.
    #[must_use]
    pub fn csv() -> Self {
        Self {
            delimiter: ',',
            comment: None,
        }
    }

    fn reader_builder(&self) -> Result<csv::ReaderBuilder, TableError> {
        let delimiter = ascii_byte("delimiter", self.delimiter)?;
        let comment = self
            .comment
            .map(|c| ascii_byte("comment", c))
            .transpose()?;
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(delimiter)
            .comment(comment)
            .has_headers(true)
            .flexible(true);
        Ok(builder)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::tsv_with_comments()
    }
}

fn ascii_byte(option: &'static str, c: char) -> Result<u8, TableError> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(TableError::NonAsciiOption { option, found: c })
}

type Row = Vec<Option<String>>;

/// An in-memory table of optional text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// A table with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a delimited table from `reader`.
    ///
    /// The first non-comment line is the header. Rows with fewer fields than the header
    /// are padded with missing cells; rows with more fields are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_analysis::table::{LoadOptions, Table};
    /// let text = "#metadata\nID\tOS_MONTHS\nP1\t12.5\nP2\tNA\n";
    /// let table = Table::from_reader(text.as_bytes(), &LoadOptions::tsv_with_comments()).unwrap();
    /// assert_eq!(table.shape(), (2, 2));
    /// assert_eq!(table.cell(1, 1), None);
    /// ```
    pub fn from_reader<R>(reader: R, options: &LoadOptions) -> Result<Self, TableError>
    where
        R: Read,
    {
        let mut reader = options.reader_builder()?.from_reader(reader);
        let columns = reader
            .headers()
            .map_err(|source| TableError::Csv { source })?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(TableError::NoColumns);
        }

        let mut rows = vec![];
        for record in reader.records() {
            let record = record.map_err(|source| TableError::Csv { source })?;
            if record.len() > columns.len() {
                return Err(TableError::RaggedRow {
                    line: record.position().map_or(0, csv::Position::line),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut row = record
                .iter()
                .map(|cell| (!is_missing_marker(cell)).then(|| cell.to_owned()))
                .collect::<Row>();
            row.resize(columns.len(), None);
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_owned(),
            })
    }

    /// The cell at `row`, `column`, or `None` if missing or out of range.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).and_then(Option::as_deref))
    }

    /// Replaces the column called `name`, or appends it if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<String>>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_owned(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        let idx = if let Some(idx) = self.column_index(name) {
            idx
        } else {
            self.columns.push(name.to_owned());
            for row in &mut self.rows {
                row.push(None);
            }
            self.columns.len() - 1
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    /// Keeps only the rows for which `keep` returns `true`.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Option<String>]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Number of missing cells per column, in column order.
    #[must_use]
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let missing = self.column_values(idx).filter(Option::is_none).count();
                (name.clone(), missing)
            })
            .collect()
    }

    /// The first `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Renders a fixed-width preview with the row position as index column.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "Empty table (0 rows, 0 columns)");
        }
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                self.column_values(idx)
                    .map(|v| v.unwrap_or(MISSING_DISPLAY).chars().count())
                    .chain([name.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect::<Vec<_>>();

        write!(f, "{:index_width$}", "")?;
        for (name, &width) in self.columns.iter().zip(&widths) {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{i:<index_width$}")?;
            for (cell, &width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell.as_deref().unwrap_or(MISSING_DISPLAY))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
