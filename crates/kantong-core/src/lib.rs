//! # Kantong Core
//!
//! Preprocessing layer for the Kantong transaction classifier. Provides
//! label encoding, text normalization, and fixed-length vectorization, plus
//! JSON persistence of both so the exported browser model can replay the
//! exact training-time transformation.
//!
//! ## Quick Start
//!
//! ```rust
//! use kantong_core::{TextVectorizer, LabelEncoder};
//!
//! let (encoder, ids) = LabelEncoder::fit_transform(&["expense", "income"]).unwrap();
//! assert_eq!(ids, vec![0, 1]);
//!
//! let mut vectorizer = TextVectorizer::default();
//! vectorizer.fit(["beli kopi", "gaji bulanan"]).unwrap();
//! let sequence = vectorizer.vectorize("beli kopi").unwrap();
//! assert_eq!(sequence.len(), 10);
//! ```
pub mod error;
pub mod labels;
pub mod text;
pub mod vectorizer;

// Re-export primary API
pub use error::{KantongError, Result};
pub use labels::LabelEncoder;
pub use vectorizer::{TextVectorizer, VectorizerConfig, OOV_ID, PAD_ID};
