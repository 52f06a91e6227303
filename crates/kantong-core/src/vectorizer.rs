//! # Text vectorizer
//!
//! Builds a frequency-ranked vocabulary over the training corpus and maps
//! each text row to a fixed-length integer sequence. The full internal state
//! is serializable to JSON so the identical transformation can be replayed at
//! inference time.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KantongError, Result};
use crate::text::split_words;

/// Reserved id for padding.
pub const PAD_ID: u32 = 0;

/// Reserved id for out-of-vocabulary words.
pub const OOV_ID: u32 = 1;

/// Vectorizer configuration.
///
/// These are the fixed pipeline hyperparameters; the same values must be used
/// at inference time, which is why the config is persisted as part of
/// `tokenizer.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Bound on vocabulary ids fed to the embedding layer. Word ids at or
    /// above this bound collapse to [`OOV_ID`].
    pub max_vocab_size: usize,
    /// Every output sequence has exactly this length.
    pub max_sequence_length: usize,
    /// Token string reserved for out-of-vocabulary words.
    pub oov_token: String,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_vocab_size: 1000,
            max_sequence_length: 10,
            oov_token: "<OOV>".to_string(),
        }
    }
}

/// Converts text rows into fixed-length sequences of word ids.
///
/// Id assignment after [`fit`](TextVectorizer::fit): 0 is padding, 1 is the
/// out-of-vocabulary token, and corpus words take 2.. in descending frequency
/// order (ties broken by first appearance). The whole vocabulary is indexed;
/// the `max_vocab_size` bound is applied at lookup time so the embedding
/// input dimension stays fixed regardless of corpus size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextVectorizer {
    config: VectorizerConfig,
    word_counts: HashMap<String, u64>,
    word_index: HashMap<String, u32>,
    document_count: u64,
}

impl TextVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            word_counts: HashMap::new(),
            word_index: HashMap::new(),
            document_count: 0,
        }
    }

    /// Scan the corpus once and build the vocabulary.
    pub fn fit<I, S>(&mut self, texts: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // First-appearance order doubles as the frequency tie-break.
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut documents = 0u64;

        for text in texts {
            documents += 1;
            for word in split_words(text.as_ref()) {
                match counts.get_mut(&word) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(word.clone(), 1);
                        order.push(word);
                    }
                }
            }
        }

        if documents == 0 {
            return Err(KantongError::EmptyCorpus);
        }

        order.sort_by(|a, b| counts[b].cmp(&counts[a]));

        let mut word_index = HashMap::with_capacity(order.len() + 1);
        word_index.insert(self.config.oov_token.clone(), OOV_ID);
        for (rank, word) in order.into_iter().enumerate() {
            word_index.insert(word, OOV_ID + 1 + rank as u32);
        }

        self.document_count = documents;
        self.word_counts = counts;
        self.word_index = word_index;
        Ok(())
    }

    /// Whether [`fit`](TextVectorizer::fit) has built a vocabulary.
    pub fn is_fitted(&self) -> bool {
        !self.word_index.is_empty()
    }

    /// Look up the id for a single word, applying the vocabulary bound.
    pub fn word_id(&self, word: &str) -> u32 {
        match self.word_index.get(word) {
            Some(&id) if (id as usize) < self.config.max_vocab_size => id,
            _ => OOV_ID,
        }
    }

    /// Convert one text row into a sequence of exactly
    /// `max_sequence_length` ids.
    ///
    /// Unknown words become [`OOV_ID`], excess trailing words are truncated,
    /// and short rows are post-padded with [`PAD_ID`].
    pub fn vectorize(&self, text: &str) -> Result<Vec<u32>> {
        if !self.is_fitted() {
            return Err(KantongError::NotFitted);
        }

        let len = self.config.max_sequence_length;
        let mut sequence: Vec<u32> = split_words(text)
            .iter()
            .take(len)
            .map(|w| self.word_id(w))
            .collect();
        sequence.resize(len, PAD_ID);
        Ok(sequence)
    }

    /// Vectorize the full corpus, preserving row order.
    pub fn vectorize_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>> {
        texts.iter().map(|t| self.vectorize(t.as_ref())).collect()
    }

    /// The configuration this vectorizer was built with.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Number of indexed entries, including the out-of-vocabulary token.
    /// May exceed `max_vocab_size`; the bound is applied at lookup.
    pub fn indexed_words(&self) -> usize {
        self.word_index.len()
    }

    /// Serialize the full state (config, counts, index) to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a vectorizer from its JSON state.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the full state to `tokenizer.json`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)
            .map_err(|e| KantongError::StateSaveError(e.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), words = self.word_index.len(), "wrote vectorizer state");
        Ok(())
    }

    /// Load a previously saved vectorizer state.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KantongError::StateLoadError(e.to_string()))?;
        Self::from_json(&content)
    }
}

impl Default for TextVectorizer {
    fn default() -> Self {
        Self::new(VectorizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(texts: &[&str]) -> TextVectorizer {
        let mut v = TextVectorizer::default();
        v.fit(texts.iter().copied()).unwrap();
        v
    }

    #[test]
    fn test_fixed_length_invariant() {
        let v = fitted(&["beli kopi", "gaji bulanan", "beli makan"]);

        for text in ["", "beli", "satu dua tiga empat lima enam tujuh delapan sembilan sepuluh sebelas"] {
            assert_eq!(v.vectorize(text).unwrap().len(), 10);
        }
    }

    #[test]
    fn test_truncates_trailing_words() {
        let v = fitted(&["a b c d e f g h i j k l"]);
        let seq = v.vectorize("a b c d e f g h i j k l").unwrap();

        assert_eq!(seq.len(), 10);
        assert_eq!(seq[0], v.word_id("a"));
        assert_eq!(seq[9], v.word_id("j"));
    }

    #[test]
    fn test_post_pads_short_rows() {
        let v = fitted(&["beli kopi"]);
        let seq = v.vectorize("beli kopi").unwrap();

        assert_ne!(seq[0], PAD_ID);
        assert_ne!(seq[1], PAD_ID);
        assert_eq!(&seq[2..], &[PAD_ID; 8]);
    }

    #[test]
    fn test_frequency_ranked_ids() {
        // "beli" appears twice, everything else once, so it gets the first
        // word id after the reserved slots.
        let v = fitted(&["beli kopi", "gaji bulanan", "beli makan"]);

        assert_eq!(v.word_id("beli"), 2);
        assert!(v.word_id("kopi") > 2);
    }

    #[test]
    fn test_shared_word_shares_nonzero_id() {
        let v = fitted(&["beli kopi", "gaji bulanan", "beli makan"]);

        let kopi = v.vectorize("beli kopi").unwrap();
        let makan = v.vectorize("beli makan").unwrap();

        assert_eq!(kopi[0], makan[0]);
        assert_ne!(kopi[0], PAD_ID);
        assert_ne!(kopi[1], makan[1]);
    }

    #[test]
    fn test_unknown_word_maps_to_oov() {
        let v = fitted(&["beli kopi"]);
        let seq = v.vectorize("jual sepeda").unwrap();

        assert_eq!(seq[0], OOV_ID);
        assert_eq!(seq[1], OOV_ID);
    }

    #[test]
    fn test_vocab_bound_collapses_to_oov() {
        let mut v = TextVectorizer::new(VectorizerConfig {
            max_vocab_size: 3,
            ..VectorizerConfig::default()
        });
        // "beli" ranks first (id 2, in bounds); "kopi" and "makan" overflow.
        v.fit(["beli kopi", "beli makan"]).unwrap();

        assert_eq!(v.word_id("beli"), 2);
        assert_eq!(v.word_id("kopi"), OOV_ID);
        assert_eq!(v.word_id("makan"), OOV_ID);
    }

    #[test]
    fn test_unfitted_vectorize_fails() {
        let v = TextVectorizer::default();
        assert!(matches!(
            v.vectorize("beli kopi"),
            Err(KantongError::NotFitted)
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let mut v = TextVectorizer::default();
        let texts: [&str; 0] = [];
        assert!(matches!(v.fit(texts), Err(KantongError::EmptyCorpus)));
    }

    #[test]
    fn test_state_roundtrip_reproduces_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");

        let texts = ["beli kopi susu", "gaji bulanan", "beli makan siang"];
        let v = fitted(&texts);
        v.save(&path).unwrap();

        let restored = TextVectorizer::load(&path).unwrap();
        assert_eq!(restored, v);
        for text in texts {
            assert_eq!(restored.vectorize(text).unwrap(), v.vectorize(text).unwrap());
        }
    }
}
