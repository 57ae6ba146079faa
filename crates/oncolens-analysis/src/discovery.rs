//! Sample file discovery
//!
//! Expression samples are gzip-compressed CSV files whose file names carry a
//! group marker (`MCF7`, `PR`, `DXR`). Discovery lists the files of a directory
//! through a [`FileLister`] and buckets them by the first marker, in priority
//! order, that appears in the file name.
//!
//! Listing order is kept within each group; it decides the replicate numbering
//! used during aggregation.

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::expression::ExpressionError;

/// Capability to enumerate candidate sample files in a directory.
pub trait FileLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Lists files matching a glob pattern inside the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobLister {
    pattern: String,
}

impl GlobLister {
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Default for GlobLister {
    fn default() -> Self {
        Self::new("*.csv.gz")
    }
}

impl FileLister for GlobLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir_pattern = glob::Pattern::escape(&dir.to_string_lossy());
        let pattern = format!("{dir_pattern}/{}", self.pattern);
        // Hidden files such as `._x.csv.gz` only match a pattern that starts with a dot
        let options = glob::MatchOptions {
            require_literal_leading_dot: true,
            ..glob::MatchOptions::new()
        };
        let paths = glob::glob_with(&pattern, options)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        paths
            .map(|entry| entry.map_err(io::Error::from))
            .filter(|entry| entry.as_ref().map_or(true, |path| path.is_file()))
            .collect()
    }
}

/// A sample group and the file-name substring that identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMarker {
    pub label: String,
    pub marker: String,
}

impl GroupMarker {
    #[must_use]
    pub fn new(label: &str, marker: &str) -> Self {
        Self {
            label: label.to_owned(),
            marker: marker.to_owned(),
        }
    }
}

/// Group markers in priority order: the first one found in a file name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMarkers(Vec<GroupMarker>);

impl Default for GroupMarkers {
    fn default() -> Self {
        Self(vec![
            GroupMarker::new("MCF7", "MCF7"),
            GroupMarker::new("PR", "PR"),
            GroupMarker::new("DXR", "DXR"),
        ])
    }
}

impl GroupMarkers {
    #[must_use]
    pub fn new(markers: Vec<GroupMarker>) -> Self {
        Self(markers)
    }

    /// Classifies a file name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oncolens_analysis::discovery::GroupMarkers;
    /// let markers = GroupMarkers::default();
    /// assert_eq!(markers.classify("GSM1_MCF7_rep1.csv.gz").map(|m| m.label.as_str()), Some("MCF7"));
    /// // PR is checked before DXR
    /// assert_eq!(markers.classify("GSM2_PR_DXR.csv.gz").map(|m| m.label.as_str()), Some("PR"));
    /// assert!(markers.classify("GSM3_control.csv.gz").is_none());
    /// ```
    #[must_use]
    pub fn classify(&self, file_name: &str) -> Option<&GroupMarker> {
        self.0.iter().find(|m| file_name.contains(&m.marker))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupMarker> + '_ {
        self.0.iter()
    }

    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        self.0.iter().any(|m| m.label == label)
    }
}

/// Files of one sample group, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroupFiles {
    pub label: String,
    pub files: Vec<PathBuf>,
}

/// Result of [`discover_samples`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDiscovery {
    /// One entry per marker, in marker priority order (possibly without files).
    pub groups: Vec<SampleGroupFiles>,
    /// Files matching no marker.
    pub unmatched: Vec<PathBuf>,
}

impl SampleDiscovery {
    #[must_use]
    pub fn files_of(&self, label: &str) -> &[PathBuf] {
        self.groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.files.as_slice())
            .unwrap_or_default()
    }
}

/// Lists `dir` and buckets the files into sample groups.
///
/// Only the file name takes part in matching, never the parent directories.
pub fn discover_samples(
    lister: &dyn FileLister,
    dir: &Path,
    markers: &GroupMarkers,
) -> Result<SampleDiscovery, ExpressionError> {
    let files = lister
        .list(dir)
        .map_err(|source| ExpressionError::Listing {
            dir: dir.to_owned(),
            source,
        })?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "listed sample files");

    let mut groups = markers
        .iter()
        .map(|m| SampleGroupFiles {
            label: m.label.clone(),
            files: vec![],
        })
        .collect::<Vec<_>>();
    let mut unmatched = vec![];

    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let group = markers
            .classify(&file_name)
            .and_then(|marker| groups.iter_mut().find(|g| g.label == marker.label));
        if let Some(group) = group {
            group.files.push(path);
        } else {
            tracing::warn!("File {file_name} did not match any expected group.");
            unmatched.push(path);
        }
    }

    Ok(SampleDiscovery { groups, unmatched })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLister(Vec<&'static str>);

    impl FileLister for FakeLister {
        fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
            Ok(self.0.iter().map(|name| dir.join(name)).collect())
        }
    }

    struct FailingLister;

    impl FileLister for FailingLister {
        fn list(&self, _dir: &Path) -> io::Result<Vec<PathBuf>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"))
        }
    }

    #[test]
    fn test_buckets_in_listing_order() {
        let lister = FakeLister(vec![
            "GSM2_MCF7_2.csv.gz",
            "GSM4_PR_1.csv.gz",
            "GSM1_MCF7_1.csv.gz",
            "GSM9_DXR_1.csv.gz",
            "GSM7_ctrl.csv.gz",
        ]);
        let dir = Path::new("/data/GSE288840_RAW");
        let discovery = discover_samples(&lister, dir, &GroupMarkers::default()).unwrap();

        assert_eq!(
            discovery.files_of("MCF7"),
            [dir.join("GSM2_MCF7_2.csv.gz"), dir.join("GSM1_MCF7_1.csv.gz")]
        );
        assert_eq!(discovery.files_of("PR").len(), 1);
        assert_eq!(discovery.files_of("DXR").len(), 1);
        assert_eq!(discovery.unmatched, vec![dir.join("GSM7_ctrl.csv.gz")]);
    }

    #[test]
    fn test_priority_order_pr_before_dxr() {
        let lister = FakeLister(vec!["GSM5_DXR_PR.csv.gz"]);
        let discovery =
            discover_samples(&lister, Path::new("/d"), &GroupMarkers::default()).unwrap();
        assert_eq!(discovery.files_of("PR").len(), 1);
        assert!(discovery.files_of("DXR").is_empty());
    }

    #[test]
    fn test_custom_priority_order() {
        let markers = GroupMarkers::new(vec![
            GroupMarker::new("DXR", "DXR"),
            GroupMarker::new("PR", "PR"),
        ]);
        let lister = FakeLister(vec!["GSM5_DXR_PR.csv.gz"]);
        let discovery = discover_samples(&lister, Path::new("/d"), &markers).unwrap();
        assert_eq!(discovery.files_of("DXR").len(), 1);
    }

    #[test]
    fn test_directory_names_do_not_classify() {
        let lister = FakeLister(vec!["sample.csv.gz"]);
        let discovery =
            discover_samples(&lister, Path::new("/MCF7_runs"), &GroupMarkers::default()).unwrap();
        assert_eq!(discovery.unmatched.len(), 1);
        assert!(discovery.groups.iter().all(|g| g.files.is_empty()));
    }

    #[test]
    fn test_listing_failure() {
        let err = discover_samples(&FailingLister, Path::new("/d"), &GroupMarkers::default())
            .unwrap_err();
        assert!(matches!(err, ExpressionError::Listing { .. }));
    }

    #[test]
    fn test_glob_lister_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_MCF7.csv.gz"), b"").unwrap();
        std::fs::write(dir.path().join("b_PR.csv"), b"").unwrap();
        std::fs::create_dir(dir.path().join("c_DXR.csv.gz")).unwrap();
        let files = GlobLister::default().list(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a_MCF7.csv.gz")]);
    }

    #[test]
    fn test_glob_lister_skips_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("GSM1_MCF7.csv.gz"), b"").unwrap();
        std::fs::write(dir.path().join("._GSM1_MCF7.csv.gz"), b"").unwrap();
        let discovery =
            discover_samples(&GlobLister::default(), dir.path(), &GroupMarkers::default())
                .unwrap();
        assert_eq!(
            discovery.files_of("MCF7"),
            [dir.path().join("GSM1_MCF7.csv.gz")]
        );
        assert!(discovery.unmatched.is_empty());
    }
}
