//! Sensitive-word masking for free-text profile fields.
//!
//! The word list comes from configuration; matching is plain substring
//! replacement. Injected into the account service as a trait so tests can
//! substitute their own filter.

/// Filter replacing configured sensitive words in free text.
pub trait SensitiveWordFilter: Send + Sync {
    fn filter(&self, text: &str) -> String;
}

/// Masks every occurrence of a configured word with same-length asterisks.
pub struct WordListFilter {
    words: Vec<String>,
}

impl WordListFilter {
    pub fn new(words: Vec<String>) -> Self {
        let words = words.into_iter().filter(|w| !w.is_empty()).collect();
        Self { words }
    }
}

impl SensitiveWordFilter for WordListFilter {
    fn filter(&self, text: &str) -> String {
        let mut filtered = text.to_string();
        for word in &self.words {
            let mask = "*".repeat(word.chars().count());
            filtered = filtered.replace(word.as_str(), &mask);
        }
        filtered
    }
}

/// Pass-through filter for deployments without a word list.
pub struct NoopFilter;

impl SensitiveWordFilter for NoopFilter {
    fn filter(&self, text: &str) -> String {
        text.to_string()
    }
}
