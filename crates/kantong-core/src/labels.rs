//! # Label encoder
//!
//! Maps category strings to dense integer ids and persists the id→label
//! mapping for the inference side.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KantongError, Result};

/// Encodes category labels as dense integer ids.
///
/// Ids are assigned in sorted order of the distinct labels, so the mapping is
/// independent of row order in the dataset. Ids form the dense range
/// `0..num_classes()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder over the label column.
    ///
    /// Duplicates are allowed; the distinct values are collected and sorted.
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();

        if distinct.is_empty() {
            return Err(KantongError::EmptyCorpus);
        }

        Ok(Self {
            classes: distinct.into_iter().collect(),
        })
    }

    /// Fit and immediately encode the same label column.
    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> Result<(Self, Vec<u32>)> {
        let encoder = Self::fit(labels.iter().map(|l| l.as_ref()))?;
        let encoded = encoder.transform(labels)?;
        Ok((encoder, encoded))
    }

    /// Encode a single label.
    pub fn encode(&self, label: &str) -> Result<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map(|i| i as u32)
            .map_err(|_| KantongError::UnknownLabel {
                label: label.to_string(),
            })
    }

    /// Encode a full label column, preserving row order.
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<u32>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    /// Look up the label string for an id.
    pub fn decode(&self, id: u32) -> Option<&str> {
        self.classes.get(id as usize).map(String::as_str)
    }

    /// Number of distinct labels. Also the width of the model's output layer.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// The id→label mapping with stringified integer keys, as stored in
    /// `label_map.json`.
    pub fn label_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, label)| (i.to_string(), serde_json::Value::String(label.clone())))
            .collect()
    }

    /// Write the id→label mapping to a JSON file.
    pub fn save_label_map<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.label_map())?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| KantongError::StateSaveError(e.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), "wrote label map");
        Ok(())
    }

    /// Restore an encoder from a persisted `label_map.json`.
    ///
    /// The keys must form the dense range `0..n`.
    pub fn load_label_map<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KantongError::StateLoadError(e.to_string()))?;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)?;

        let mut classes = vec![None; map.len()];
        for (key, value) in &map {
            let id: usize = key
                .parse()
                .map_err(|_| KantongError::StateLoadError(format!("non-integer key {key:?}")))?;
            let label = value
                .as_str()
                .ok_or_else(|| KantongError::StateLoadError(format!("non-string label for {key}")))?;
            let slot = classes
                .get_mut(id)
                .ok_or_else(|| KantongError::StateLoadError(format!("id {id} out of range")))?;
            *slot = Some(label.to_string());
        }

        let classes: Vec<String> = classes
            .into_iter()
            .collect::<Option<_>>()
            .ok_or_else(|| KantongError::StateLoadError("label ids are not dense".into()))?;

        Ok(Self { classes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_distinct() {
        let (encoder, encoded) =
            LabelEncoder::fit_transform(&["expense", "income", "expense"]).unwrap();

        assert_eq!(encoder.num_classes(), 2);
        assert_eq!(encoder.encode("expense").unwrap(), 0);
        assert_eq!(encoder.encode("income").unwrap(), 1);
        assert_eq!(encoded, vec![0, 1, 0]);
    }

    #[test]
    fn test_ids_are_dense_and_order_independent() {
        let a = LabelEncoder::fit(["c", "a", "b"]).unwrap();
        let b = LabelEncoder::fit(["b", "b", "c", "a"]).unwrap();
        assert_eq!(a, b);

        for id in 0..a.num_classes() as u32 {
            assert!(a.decode(id).is_some());
        }
        assert!(a.decode(a.num_classes() as u32).is_none());
    }

    #[test]
    fn test_unknown_label() {
        let encoder = LabelEncoder::fit(["expense"]).unwrap();
        assert!(matches!(
            encoder.encode("income"),
            Err(KantongError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_empty_labels() {
        let labels: [&str; 0] = [];
        assert!(matches!(
            LabelEncoder::fit(labels),
            Err(KantongError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_label_map_shape() {
        let encoder = LabelEncoder::fit(["income", "expense"]).unwrap();
        let map = encoder.label_map();

        assert_eq!(map.len(), 2);
        assert_eq!(map["0"], "expense");
        assert_eq!(map["1"], "income");
    }

    #[test]
    fn test_label_map_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label_map.json");

        let encoder = LabelEncoder::fit(["expense", "income", "transfer"]).unwrap();
        encoder.save_label_map(&path).unwrap();

        let restored = LabelEncoder::load_label_map(&path).unwrap();
        assert_eq!(restored, encoder);
    }

    #[test]
    fn test_load_rejects_sparse_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label_map.json");
        std::fs::write(&path, r#"{"0": "expense", "2": "income"}"#).unwrap();

        assert!(LabelEncoder::load_label_map(&path).is_err());
    }
}
