/// Domains must be seen strictly more often than this to qualify.
pub const MIN_DOMAIN_SUPPORT: u32 = 30;

/// Keywords kept per category after counting.
pub const TOP_KEYWORDS: usize = 100;

/// Keywords asked from the token extractor for one ad text.
pub const EXTRACTED_TOKENS: usize = 20;

/// Default number of keywords printed per category.
pub const DISPLAYED_KEYWORDS: usize = 10;

/// Default domain report location.
pub const DEFAULT_REPORT_PATH: &str = "countdomain.txt";

/// Default table read from SQLite inputs.
pub const DEFAULT_TABLE: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub min_domain_support: u32,
    pub top_keywords: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_domain_support: MIN_DOMAIN_SUPPORT,
            top_keywords: TOP_KEYWORDS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_args(args: &crate::args::Args) -> Self {
        let defaults = Self::default();
        Self {
            min_domain_support: args.min_support.unwrap_or(defaults.min_domain_support),
            top_keywords: args.top_keywords.unwrap_or(defaults.top_keywords),
        }
    }
}
