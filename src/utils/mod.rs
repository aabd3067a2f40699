//! Utility functions and helpers.

pub mod html;
pub mod sensitive_words;

pub use sensitive_words::{NoopFilter, SensitiveWordFilter, WordListFilter};
