use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::record::AdEnvelopeRecord;

/// Domain occurrence counts over the full, unpruned record set.
#[derive(Debug, Clone, Default)]
pub struct DomainFrequencyTable {
    counts: HashMap<String, u32>,
    total: u32,
}

impl DomainFrequencyTable {
    pub fn from_records(records: &[AdEnvelopeRecord]) -> Self {
        Self::from_domains(records.iter().map(|r| r.domain.as_str()))
    }

    pub fn from_domains<'a>(domains: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::default();
        for domain in domains {
            *table.counts.entry(domain.to_string()).or_insert(0) += 1;
            table.total += 1;
        }
        table
    }

    pub fn count(&self, domain: &str) -> u32 {
        self.counts.get(domain).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn unique_domains(&self) -> usize {
        self.counts.len()
    }

    /// Domains seen strictly more than `min_support` times, most frequent
    /// first. Equal counts are ordered by domain name to keep reports stable.
    pub fn qualifying(&self, min_support: u32) -> Vec<(String, u32)> {
        let mut qualifying: Vec<(String, u32)> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > min_support)
            .map(|(domain, count)| (domain.clone(), *count))
            .collect();
        qualifying.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        qualifying
    }
}

/// Keeps records whose raw content mentions at least one qualifying domain.
///
/// Matching is by substring over the whole message, so links that differ only
/// in path or query still land on their canonical qualifying domain.
pub fn prune_records(
    records: Vec<AdEnvelopeRecord>,
    qualifying: &[(String, u32)],
) -> (Vec<AdEnvelopeRecord>, u32) {
    let before = records.len();
    let kept: Vec<AdEnvelopeRecord> = records
        .into_iter()
        .filter(|record| {
            qualifying
                .iter()
                .any(|(domain, _)| record.content.contains(domain.as_str()))
        })
        .collect();
    let pruned = (before - kept.len()) as u32;
    (kept, pruned)
}

pub fn format_domain_report(qualifying: &[(String, u32)]) -> String {
    qualifying
        .iter()
        .map(|(domain, count)| format!("{domain}\t{count}\n"))
        .collect()
}

pub fn write_domain_report(path: &Path, qualifying: &[(String, u32)]) -> anyhow::Result<()> {
    let start_time = Instant::now();
    fs::write(path, format_domain_report(qualifying))
        .with_context(|| format!("Failed to write domain report to {:?}", path))?;
    info!(
        action = "write",
        component = "domain_report",
        file_path = ?path,
        domain_count = qualifying.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Domain report written"
    );
    Ok(())
}
