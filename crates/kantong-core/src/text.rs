//! # Word splitting for the vectorizer
//!
//! Normalizes free text into lowercase words before vocabulary lookup.
//! Punctuation is treated as a word boundary, matching the transformation
//! the exported browser model expects at inference time.

/// Characters stripped from text before splitting.
const FILTERS: &[char] = &[
    '!', '"', '#', '$', '%', '&', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<', '=', '>',
    '?', '@', '[', '\\', ']', '^', '_', '`', '{', '|', '}', '~', '\t', '\n', '\'',
];

/// Split a text row into normalized words.
///
/// Lowercases the input, replaces every filter character with a space, and
/// splits on whitespace. Empty fragments are dropped.
///
/// # Examples
/// ```
/// use kantong_core::text::split_words;
///
/// let words = split_words("Beli kopi, 2x!");
/// assert_eq!(words, vec!["beli", "kopi", "2x"]);
/// ```
pub fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || FILTERS.contains(&c))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
