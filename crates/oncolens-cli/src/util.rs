use std::{
    fs::{self, File},
    io,
    path::Path,
};

use anyhow::Context;

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Creates the parent directory of an output file if it does not exist yet.
pub fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Formats an optional number, printing `NaN` for a missing value.
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "NaN".to_owned(), |v| format!("{v:.precision$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.csv");
        create_parent_dir(&path).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        create_parent_dir(Path::new("bare.csv")).unwrap();
    }

    #[test]
    fn test_format_opt() {
        assert_eq!(format_opt(Some(1.23456), 3), "1.235");
        assert_eq!(format_opt(None, 3), "NaN");
    }
}
