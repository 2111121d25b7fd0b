use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::{CategoryWordFrequency, KeywordCount};
use crate::error::Error;
use crate::record::Category;
use crate::timeline::{bucket_label, CategoryTimeHistogram, TimeHistogram};

// Include default recommendations at compile time
const DEFAULT_RECOMMENDATIONS_BYTES: &[u8] = include_bytes!("../default_recommendations.txt");

pub const DEFAULT_RECOMMENDATIONS_FILE: &str = "recommendations.txt";

/// Entry shown when the user does not know which category fits their app.
pub const GENERAL_ENTRY: &str = "Not Sure";

const DERIVED_KEYWORDS: usize = 5;
const DERIVED_TIME_WINDOWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub advice: String,
    pub derived: bool,
}

/// Parses `[Name]` headed blocks of advice text.
pub fn parse_recommendations(content: &str) -> std::result::Result<Vec<Recommendation>, Error> {
    let mut entries: Vec<Recommendation> = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Recommendations {
                    line: line_num + 1,
                    reason: "empty category name".to_string(),
                });
            }
            entries.push(Recommendation {
                name: name.to_string(),
                advice: String::new(),
                derived: false,
            });
            continue;
        }

        match entries.last_mut() {
            Some(entry) => {
                if !entry.advice.is_empty() {
                    entry.advice.push('\n');
                }
                entry.advice.push_str(line);
            }
            None => {
                return Err(Error::Recommendations {
                    line: line_num + 1,
                    reason: "advice text before any [Category] header".to_string(),
                })
            }
        }
    }

    Ok(entries)
}

pub fn load_recommendations(path: Option<&Path>) -> Result<Vec<Recommendation>> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "recommendation_loading",
        "Starting recommendation loading"
    );

    let entries = if let Some(path) = path {
        info!(action = "load", component = "recommendation_file", file_path = ?path, "Loading recommendations from specified file");
        if !path.exists() {
            anyhow::bail!("Recommendation file not found: {:?}", path);
        }
        let content = fs::read_to_string(path)?;
        parse_recommendations(&content)?
    } else {
        // Try default file
        let default_file = Path::new(DEFAULT_RECOMMENDATIONS_FILE);
        let mut entries = Vec::new();
        if default_file.exists() {
            info!(action = "load", component = "default_recommendation_file", file_path = ?default_file, "Loading recommendations from default file");
            let content = fs::read_to_string(default_file)?;
            match parse_recommendations(&content) {
                Ok(parsed) => entries = parsed,
                Err(e) => {
                    warn!(action = "parse", component = "default_recommendation_file", error = %e, "Invalid recommendation file")
                }
            }
        }

        if entries.is_empty() {
            info!(
                action = "load",
                component = "embedded_recommendations",
                "Using embedded default recommendations"
            );
            entries = parse_recommendations(embedded_defaults()?)?;
        }
        entries
    };

    info!(
        action = "complete",
        component = "recommendation_loading",
        entry_count = entries.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded recommendations"
    );
    Ok(entries)
}

fn embedded_defaults() -> Result<&'static str> {
    std::str::from_utf8(DEFAULT_RECOMMENDATIONS_BYTES)
        .context("Failed to decode embedded default recommendations")
}

pub fn init_default_recommendations() -> Result<()> {
    let default_file = Path::new(DEFAULT_RECOMMENDATIONS_FILE);

    if default_file.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            DEFAULT_RECOMMENDATIONS_FILE
        );
    }

    fs::write(default_file, embedded_defaults()?)?;
    println!("Created {} with default recommendations", DEFAULT_RECOMMENDATIONS_FILE);

    Ok(())
}

/// Advice built from a category's own aggregates: its top keywords and the
/// busiest hourly windows.
pub fn derive_advice(keywords: &[KeywordCount], histogram: Option<&TimeHistogram>) -> String {
    let words: Vec<&str> = keywords
        .iter()
        .take(DERIVED_KEYWORDS)
        .map(|k| k.keyword.as_str())
        .collect();
    let windows: Vec<String> = histogram
        .map(|h| h.busiest(DERIVED_TIME_WINDOWS))
        .unwrap_or_default()
        .iter()
        .map(|b| bucket_label(b.bucket))
        .collect();

    let mut advice = String::new();
    if !words.is_empty() {
        advice.push_str("Popular words:\n");
        advice.push_str(&words.join(", "));
    }
    if !windows.is_empty() {
        if !advice.is_empty() {
            advice.push('\n');
        }
        advice.push_str("Good Time:\n");
        advice.push_str(&windows.join(", "));
    }
    advice
}

/// Category name to advice lookup for presentation layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationTable {
    entries: Vec<Recommendation>,
}

impl RecommendationTable {
    /// Curated entries come first. Named categories with aggregates but no
    /// curated entry get derived advice.
    pub fn build(
        curated: Vec<Recommendation>,
        keywords: &CategoryWordFrequency,
        histograms: &CategoryTimeHistogram,
    ) -> Self {
        let mut table = Self { entries: curated };

        for category in Category::NAMED {
            if table.get(category.name()).is_some() {
                continue;
            }
            let words = keywords.get(category);
            let histogram = histograms.get(category);
            if words.is_none() && histogram.is_none() {
                continue;
            }
            let advice = derive_advice(words.unwrap_or_default(), histogram);
            if advice.is_empty() {
                continue;
            }
            table.entries.push(Recommendation {
                name: category.name().to_string(),
                advice,
                derived: true,
            });
        }

        table
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
            .map(|e| e.advice.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }
}
