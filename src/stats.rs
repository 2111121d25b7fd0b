use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{CategoryWordFrequency, KeywordCount};
use crate::recommend::{Recommendation, RecommendationTable};
use crate::record::Category;
use crate::timeline::{BucketCount, CategoryTimeHistogram};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub rows_read: u32,
    pub records_parsed: u32,
    pub rows_dropped: u32,
    pub unique_domains: u32,
    pub records_pruned: u32,
    pub records_unclassified: u32,
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub date_range: (String, String, i64),
    pub stats: DatasetStats,
    pub qualifying_domains: Vec<(String, u32)>,
    pub category_counts: BTreeMap<Category, u32>,
    pub keywords: CategoryWordFrequency,
    pub histograms: CategoryTimeHistogram,
    pub recommendations: RecommendationTable,
}

#[derive(Debug, Serialize)]
pub struct DomainCount<'a> {
    pub domain: &'a str,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct CategoryReport<'a> {
    pub category: Category,
    pub records: u32,
    pub keywords: &'a [KeywordCount],
    pub buckets: Vec<BucketCount>,
}

#[derive(Debug, Serialize)]
pub struct DateRange<'a> {
    pub earliest: &'a str,
    pub latest: &'a str,
    pub days: i64,
}

/// Serializable view of an [`AnalysisResult`].
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub date_range: DateRange<'a>,
    pub stats: &'a DatasetStats,
    pub domains: Vec<DomainCount<'a>>,
    pub categories: Vec<CategoryReport<'a>>,
    pub recommendations: &'a [Recommendation],
}

impl AnalysisResult {
    pub fn report(&self) -> AnalysisReport<'_> {
        let (earliest, latest, days) = &self.date_range;
        let categories = Category::NAMED
            .into_iter()
            .filter(|c| self.category_counts.contains_key(c))
            .map(|category| CategoryReport {
                category,
                records: self.category_counts[&category],
                keywords: self.keywords.get(category).unwrap_or_default(),
                buckets: self
                    .histograms
                    .get(category)
                    .map(|h| h.entries())
                    .unwrap_or_default(),
            })
            .collect();

        AnalysisReport {
            date_range: DateRange {
                earliest,
                latest,
                days: *days,
            },
            stats: &self.stats,
            domains: self
                .qualifying_domains
                .iter()
                .map(|(domain, count)| DomainCount {
                    domain,
                    count: *count,
                })
                .collect(),
            categories,
            recommendations: self.recommendations.entries(),
        }
    }
}
