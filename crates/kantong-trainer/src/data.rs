//! Dataset loading for labeled transaction text.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

/// One CSV row: free text plus its category label.
#[derive(Debug, Deserialize)]
struct Record {
    text: String,
    kategori: String,
}

/// The loaded training corpus: two aligned columns of equal length.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub texts: Vec<String>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Load the training corpus from a CSV file.
///
/// The file must have a header row with `text` and `kategori` columns. A
/// missing file, missing column, or empty corpus is a fatal error.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> anyhow::Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;

    let mut texts = Vec::new();
    let mut labels = Vec::new();

    for record in reader.deserialize() {
        let record: Record =
            record.with_context(|| format!("malformed row in {}", path.display()))?;
        texts.push(record.text);
        labels.push(record.kategori);
    }

    if texts.is_empty() {
        bail!("dataset {} contains no rows", path.display());
    }

    tracing::info!(rows = texts.len(), path = %path.display(), "loaded dataset");
    Ok(Dataset { texts, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_aligned_columns() {
        let file = write_csv("text,kategori\nbeli kopi,expense\ngaji bulanan,income\n");
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.texts[0], "beli kopi");
        assert_eq!(dataset.labels[0], "expense");
        assert_eq!(dataset.labels[1], "income");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let file = write_csv("id,text,kategori\n1,beli kopi,expense\n");
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.texts, vec!["beli kopi"]);
    }

    #[test]
    fn test_missing_column_fails() {
        let file = write_csv("text,category\nbeli kopi,expense\n");
        assert!(load_dataset(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(load_dataset("does/not/exist.csv").is_err());
    }

    #[test]
    fn test_empty_dataset_fails() {
        let file = write_csv("text,kategori\n");
        assert!(load_dataset(file.path()).is_err());
    }
}
