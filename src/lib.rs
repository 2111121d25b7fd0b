pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod classify;
pub mod config;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod keywords;
pub mod recommend;
pub mod record;
pub mod source;
pub mod sqlite;
pub mod stats;
pub mod timeline;
pub mod utils;

pub use aggregate::{CategoryWordFrequency, KeywordCount};
pub use analysis::{analyze_dataset, analyze_rows};
pub use args::Args;
pub use classify::classify_domain;
pub use config::AnalysisConfig;
pub use domain::DomainFrequencyTable;
pub use error::{Error, Result};
pub use keywords::{FrequencyTokenExtractor, TokenExtractor};
pub use recommend::{init_default_recommendations, RecommendationTable};
pub use record::{AdEnvelopeRecord, Category, RawRow};
pub use stats::{AnalysisResult, DatasetStats};
pub use timeline::{CategoryTimeHistogram, TimeHistogram};
