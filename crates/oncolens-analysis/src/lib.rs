//! Clinical survival and gene expression analysis pipelines
//!
//! This crate holds the tabular data model and every stage of the two analysis
//! pipelines. Presentation (report tables, figures, CSV export) lives in the CLI.
//!
//! # Overview
//!
//! ## Clinical Survival Workflow
//!
//! 1. **Load** ([`clinical::load_clinical_table`]): Read a tab-separated clinical table,
//!    skipping `#` comment lines. Failures are reported and yield an empty table.
//! 2. **Clean** ([`clinical::clean_clinical`]): Derive the event flag and metastasis
//!    label, coerce survival months to numbers and drop incomplete records.
//! 3. **Describe**: Duration histogram and box plot inputs
//!    ([`clinical::CleanedClinical::durations_by_label`]).
//! 4. **Kaplan-Meier Analysis** ([`survival::SurvivalByGroup`]): One survival curve
//!    with confidence band per metastasis group.
//!
//! ## Differential Expression Workflow
//!
//! 1. **Discover Samples** ([`discovery::discover_samples`]): Bucket `*.csv.gz` files
//!    into sample groups by file-name marker.
//! 2. **Aggregate Replicates** ([`expression::aggregate_replicates`]): Inner-join the
//!    replicates of a group and average them per gene.
//! 3. **Fold Change** ([`differential::differential`]): `log2(b + 1) - log2(a + 1)`
//!    over genes present in both groups.
//! 4. **Significance** ([`significance`]): Threshold report, expression floor and
//!    regulation labels.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use oncolens_analysis::{
//!     differential::differential,
//!     discovery::{GlobLister, GroupMarkers, discover_samples},
//!     expression::{ExpressionSchema, aggregate_replicates, load_replicates},
//!     significance::{DEFAULT_EXPRESSION_FLOOR, DEFAULT_FC_THRESHOLD, expression_filter, label_regulation},
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let dir = Path::new("GSE288840_RAW");
//! let discovery = discover_samples(&GlobLister::default(), dir, &GroupMarkers::default())?;
//!
//! let schema = ExpressionSchema::default();
//! let mcf7 = aggregate_replicates("MCF7", &load_replicates(discovery.files_of("MCF7"), &schema))?;
//! let pr = aggregate_replicates("PR", &load_replicates(discovery.files_of("PR"), &schema))?;
//!
//! let merged = differential(&mcf7, &pr);
//! let labeled = label_regulation(
//!     &expression_filter(&merged, DEFAULT_EXPRESSION_FLOOR),
//!     DEFAULT_FC_THRESHOLD,
//! );
//! println!("{} genes labeled", labeled.len());
//! # Ok(())
//! # }
//! ```

pub mod clinical;
pub mod differential;
pub mod discovery;
pub mod expression;
pub mod significance;
pub mod survival;
pub mod table;
