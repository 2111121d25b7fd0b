//! Keyword extraction from ad text.
//!
//! Extraction is a pluggable capability: the pipeline only sees the
//! [`TokenExtractor`] trait so tests can substitute a fixed stub.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::EXTRACTED_TOKENS;

pub trait TokenExtractor {
    /// Returns ranked, deduplicated keywords for `text`. Short or empty
    /// text may produce nothing.
    fn extract(&self, text: &str) -> Vec<String>;
}

// Anything that is not a letter, digit or combining mark splits tokens
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\p{M}]+").expect("static separator regex"));

/// Built-in extractor that ranks word-like runs by how often they appear.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyTokenExtractor {
    limit: usize,
}

impl FrequencyTokenExtractor {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Default for FrequencyTokenExtractor {
    fn default() -> Self {
        Self::new(EXTRACTED_TOKENS)
    }
}

impl TokenExtractor for FrequencyTokenExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for token in SEPARATOR.split(text) {
            if token.chars().count() < 2 || token.chars().all(|c| c.is_numeric()) {
                continue;
            }
            let count = counts.entry(token).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }

        // stable: equal counts keep first-appearance order
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order
            .into_iter()
            .take(self.limit)
            .map(str::to_string)
            .collect()
    }
}

/// TF-IDF keyword extraction backed by jieba.
#[cfg(feature = "jieba")]
pub struct JiebaTokenExtractor {
    jieba: jieba_rs::Jieba,
    tfidf: jieba_rs::TfIdf,
    limit: usize,
}

#[cfg(feature = "jieba")]
impl JiebaTokenExtractor {
    pub fn new(limit: usize) -> Self {
        Self {
            jieba: jieba_rs::Jieba::new(),
            tfidf: jieba_rs::TfIdf::default(),
            limit,
        }
    }
}

#[cfg(feature = "jieba")]
impl Default for JiebaTokenExtractor {
    fn default() -> Self {
        Self::new(EXTRACTED_TOKENS)
    }
}

#[cfg(feature = "jieba")]
impl TokenExtractor for JiebaTokenExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        use jieba_rs::KeywordExtract;

        let mut seen = std::collections::HashSet::new();
        self.tfidf
            .extract_keywords(&self.jieba, text, self.limit, Vec::new())
            .into_iter()
            .map(|kw| kw.keyword)
            .filter(|kw| seen.insert(kw.clone()))
            .collect()
    }
}

/// Extractor used by the binary: jieba when compiled in, else the built-in one.
pub fn default_extractor() -> Box<dyn TokenExtractor> {
    #[cfg(feature = "jieba")]
    {
        Box::new(JiebaTokenExtractor::default())
    }
    #[cfg(not(feature = "jieba"))]
    {
        Box::new(FrequencyTokenExtractor::default())
    }
}
