//! Optional JSON configuration for both pipelines
//!
//! Every field has a default, so a config file only needs the keys it changes.
//! Command-line flags take precedence over values read from the file.

use std::path::Path;

use oncolens_analysis::{
    clinical::ClinicalSchema,
    discovery::GroupMarkers,
    expression::ExpressionSchema,
    significance::{DEFAULT_EXPRESSION_FLOOR, DEFAULT_FC_THRESHOLD, DEFAULT_TOP_N},
    table::LoadOptions,
};
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    pub load: LoadOptions,
    pub schema: ClinicalSchema,
    /// Number of duration histogram bins.
    pub histogram_bins: usize,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            schema: ClinicalSchema::default(),
            histogram_bins: Self::DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl SurvivalConfig {
    pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("survival config", path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Glob pattern of sample files inside the data directory.
    pub file_pattern: String,
    pub markers: GroupMarkers,
    pub schema: ExpressionSchema,
    pub baseline: String,
    pub treatment: String,
    pub threshold: f64,
    pub expression_floor: f64,
    pub top_n: usize,
    /// Number of fold-change histogram bins.
    pub histogram_bins: usize,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            file_pattern: "*.csv.gz".to_owned(),
            markers: GroupMarkers::default(),
            schema: ExpressionSchema::default(),
            baseline: "MCF7".to_owned(),
            treatment: "PR".to_owned(),
            threshold: DEFAULT_FC_THRESHOLD,
            expression_floor: DEFAULT_EXPRESSION_FLOOR,
            top_n: DEFAULT_TOP_N,
            histogram_bins: 50,
        }
    }
}

impl ExpressionConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("expression config", path),
            None => Ok(Self::default()),
        }
    }

    /// Checks that both compared groups are configured sample groups.
    pub fn validate(&self) -> anyhow::Result<()> {
        for label in [&self.baseline, &self.treatment] {
            if !self.markers.contains_label(label) {
                anyhow::bail!("group {label} is not one of the configured sample groups");
            }
        }
        if self.baseline == self.treatment {
            anyhow::bail!("baseline and treatment must be different groups, both are {}", self.baseline);
        }
        Ok(())
    }
}
