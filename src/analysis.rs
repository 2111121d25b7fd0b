use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregate::CategoryWordFrequency;
use crate::config::AnalysisConfig;
use crate::domain::{self, DomainFrequencyTable};
use crate::keywords::{self, TokenExtractor};
use crate::recommend::{self, Recommendation, RecommendationTable};
use crate::record::{parse_record, AdEnvelopeRecord, Category, RawRow};
use crate::stats::{AnalysisResult, DatasetStats};
use crate::timeline::CategoryTimeHistogram;
use crate::utils::format_number;
use crate::{source, Args};

/// Parses rows, dropping the ones without a usable link or time.
pub fn parse_rows(rows: &[RawRow], extractor: &dyn TokenExtractor) -> Vec<AdEnvelopeRecord> {
    rows.iter()
        .filter_map(|row| match parse_record(row, extractor) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(action = "parse", component = "record_parser", error = %e, "Dropping row");
                None
            }
        })
        .collect()
}

pub fn date_range(records: &[AdEnvelopeRecord]) -> (String, String, i64) {
    let dates = records.iter().filter_map(|r| r.date);
    let bounds = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, date| match acc {
        None => Some((date, date)),
        Some((lo, hi)) => Some((lo.min(date), hi.max(date))),
    });

    match bounds {
        Some((earliest, latest)) => (
            earliest.format("%B %-d, %Y").to_string(),
            latest.format("%B %-d, %Y").to_string(),
            (latest - earliest).num_days(),
        ),
        None => (
            "No data available".to_string(),
            "No data available".to_string(),
            0,
        ),
    }
}

/// Runs the full two-pass pipeline over already loaded rows.
pub fn analyze_rows(
    rows: &[RawRow],
    extractor: &dyn TokenExtractor,
    config: &AnalysisConfig,
    curated: Vec<Recommendation>,
) -> AnalysisResult {
    let start_time = Instant::now();
    info!(action = "start", component = "analysis", row_count = rows.len(), "Starting analysis");

    let records = parse_rows(rows, extractor);
    let records_parsed = records.len() as u32;
    let date_range = date_range(&records);

    // Pass 1: domain support over the unpruned set
    let table = DomainFrequencyTable::from_records(&records);
    let qualifying = table.qualifying(config.min_domain_support);
    info!(
        action = "count",
        component = "domain_filter",
        unique_domains = table.unique_domains(),
        qualifying_domains = qualifying.len(),
        min_support = config.min_domain_support,
        "Domain frequency table built"
    );
    if qualifying.is_empty() && !records.is_empty() {
        warn!(
            action = "count",
            component = "domain_filter",
            "No domain exceeds the support threshold, every record will be pruned"
        );
    }

    let (records, records_pruned) = domain::prune_records(records, &qualifying);

    // Pass 2: classify and aggregate the survivors
    let mut category_counts: BTreeMap<Category, u32> = BTreeMap::new();
    for record in &records {
        *category_counts.entry(record.classify()).or_insert(0) += 1;
    }
    let records_unclassified = category_counts.remove(&Category::Unknown).unwrap_or(0);

    let keywords = CategoryWordFrequency::build(&records, config.top_keywords);
    let histograms = CategoryTimeHistogram::build(&records);
    let recommendations = RecommendationTable::build(curated, &keywords, &histograms);

    let stats = DatasetStats {
        rows_read: rows.len() as u32,
        records_parsed,
        rows_dropped: rows.len() as u32 - records_parsed,
        unique_domains: table.unique_domains() as u32,
        records_pruned,
        records_unclassified,
    };

    info!(
        action = "complete",
        component = "analysis",
        records_kept = records.len(),
        records_pruned,
        records_unclassified,
        categories = category_counts.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Analysis completed"
    );

    AnalysisResult {
        date_range,
        stats,
        qualifying_domains: qualifying,
        category_counts,
        keywords,
        histograms,
        recommendations,
    }
}

pub fn analyze_dataset(args: &Args) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "dataset_analysis", input = ?args.input, "Starting dataset analysis");

    let rows = source::load_rows(&args.input, &args.table)?;
    let curated = recommend::load_recommendations(args.recommendations.as_deref())?;
    let extractor = keywords::default_extractor();
    let config = AnalysisConfig::from_args(args);

    let result = analyze_rows(&rows, extractor.as_ref(), &config, curated);
    domain::write_domain_report(&args.report, &result.qualifying_domains)?;

    info!(
        action = "complete",
        component = "dataset_analysis",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Dataset analysis completed"
    );
    Ok(result)
}

pub fn print_analysis_results(result: &AnalysisResult, args: &Args) {
    if let Some(name) = &args.category {
        match result.recommendations.get(name) {
            Some(advice) => println!("{}", advice),
            None => println!("No recommendation for '{}'", name),
        }
        return;
    }

    let (earliest_date, latest_date, days_between) = &result.date_range;
    let stats = &result.stats;

    println!("\n--- Red Envelope Analysis ---");

    if *days_between > 0 {
        println!(
            "Date range: {} to {} ({} days)",
            earliest_date,
            latest_date,
            format_number(*days_between as u32)
        );
    } else {
        println!("Date range: {} to {}", earliest_date, latest_date);
    }

    println!(
        "Rows read: {} ({} parsed, {} without a usable link or time)",
        format_number(stats.rows_read),
        format_number(stats.records_parsed),
        format_number(stats.rows_dropped)
    );
    println!(
        "Unique domains: {} ({} above support threshold)",
        format_number(stats.unique_domains),
        format_number(result.qualifying_domains.len() as u32)
    );
    println!(
        "Records pruned: {}, unclassified: {}",
        format_number(stats.records_pruned),
        format_number(stats.records_unclassified)
    );

    if let Some(top_count) = args.top {
        println!(
            "\nTop {} most frequent domains:",
            std::cmp::min(top_count, result.qualifying_domains.len())
        );
        for (domain, count) in result.qualifying_domains.iter().take(top_count) {
            println!("- {}: {} envelopes", domain, format_number(*count));
        }
    }

    for (category, count) in &result.category_counts {
        println!("\n[{}] {} envelopes", category, format_number(*count));

        if let Some(keywords) = result.keywords.get(*category) {
            let shown: Vec<String> = keywords
                .iter()
                .take(args.keywords)
                .map(|k| format!("{}({})", k.keyword, k.count))
                .collect();
            if !shown.is_empty() {
                println!("Keywords: {}", shown.join(", "));
            }
        }

        if let Some(histogram) = result.histograms.get(*category) {
            let busy: Vec<String> = histogram
                .entries()
                .iter()
                .filter(|b| b.count > 0)
                .map(|b| format!("{}={}", b.bucket, b.count))
                .collect();
            println!("Buckets: {}", busy.join(" "));
        }
    }

    println!("\n--- Recommendations ---");
    for entry in result.recommendations.entries() {
        let origin = if entry.derived { " (from data)" } else { "" };
        println!("\n{}{}:\n{}", entry.name, origin, entry.advice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoTokens;

    impl TokenExtractor for NoTokens {
        fn extract(&self, _text: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn date_range_spans_parsed_dates() {
        let rows = vec![
            RawRow::new("a https://x.com", "2018-03-05 10:00"),
            RawRow::new("a https://x.com", "2018-03-01 10:00"),
            RawRow::new("a https://x.com", "2018-04-01 10:00"),
        ];
        let records = parse_rows(&rows, &NoTokens);
        let (earliest, latest, days) = date_range(&records);
        assert_eq!(earliest, "March 1, 2018");
        assert_eq!(latest, "April 1, 2018");
        assert_eq!(days, 31);
    }

    #[test]
    fn empty_input_produces_empty_result() {
        let result = analyze_rows(&[], &NoTokens, &AnalysisConfig::default(), Vec::new());
        assert_eq!(result.stats, DatasetStats::default());
        assert_eq!(result.date_range.0, "No data available");
        assert!(result.category_counts.is_empty());
        assert!(result.recommendations.entries().is_empty());
    }

    #[test]
    fn parse_failures_are_counted_not_raised() {
        let rows = vec![
            RawRow::new("no link", "2018-03-01 10:00"),
            RawRow::new("bad time https://x.com", "yesterday"),
            RawRow::new("ok https://x.com", "2018-03-01 10:00"),
        ];
        let result = analyze_rows(&rows, &NoTokens, &AnalysisConfig::default(), Vec::new());
        assert_eq!(result.stats.rows_read, 3);
        assert_eq!(result.stats.records_parsed, 1);
        assert_eq!(result.stats.rows_dropped, 2);
        assert_eq!(result.stats.records_pruned, 1);
    }
}
