use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::record::{AdEnvelopeRecord, Category};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u32,
}

/// Counts tokens and keeps the `top_n` most frequent ones.
///
/// Sorted by descending count; equal counts keep the order in which tokens
/// were first seen.
pub fn word_frequency<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    top_n: usize,
) -> Vec<KeywordCount> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut counted: Vec<KeywordCount> = Vec::new();

    for token in tokens {
        match first_seen.get(token) {
            Some(&index) => counted[index].count += 1,
            None => {
                first_seen.insert(token, counted.len());
                counted.push(KeywordCount {
                    keyword: token.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so insertion order breaks ties
    counted.sort_by(|a, b| b.count.cmp(&a.count));
    counted.truncate(top_n);
    counted
}

/// Per-category keyword frequency tables.
#[derive(Debug, Clone, Default)]
pub struct CategoryWordFrequency {
    tables: BTreeMap<Category, Vec<KeywordCount>>,
}

impl CategoryWordFrequency {
    /// Pools the keywords of every record in a named category and counts them.
    /// Records tagged `Unknown` are never matched and contribute nothing.
    pub fn build(records: &[AdEnvelopeRecord], top_n: usize) -> Self {
        let mut pooled: BTreeMap<Category, Vec<&str>> = BTreeMap::new();
        for record in records {
            let category = record.category();
            if !Category::NAMED.contains(&category) {
                continue;
            }
            pooled
                .entry(category)
                .or_default()
                .extend(record.keywords.iter().map(String::as_str));
        }

        let tables = pooled
            .into_iter()
            .map(|(category, tokens)| (category, word_frequency(tokens, top_n)))
            .collect();
        Self { tables }
    }

    pub fn get(&self, category: Category) -> Option<&[KeywordCount]> {
        self.tables.get(&category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.tables.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[KeywordCount])> {
        self.tables.iter().map(|(c, t)| (*c, t.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashSet;

    fn classified(domain: &str, keywords: &[&str]) -> AdEnvelopeRecord {
        let record = AdEnvelopeRecord::new(
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            keywords.iter().map(|k| k.to_string()).collect(),
            domain,
        );
        record.classify();
        record
    }

    #[test]
    fn counts_and_orders_by_frequency_with_first_seen_ties() {
        let freq = word_frequency(["b", "a", "c", "a", "b", "d", "a"], 100);
        let pairs: Vec<(&str, u32)> = freq.iter().map(|k| (k.keyword.as_str(), k.count)).collect();
        assert_eq!(pairs, vec![("a", 3), ("b", 2), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn keeps_at_most_top_n_without_duplicates() {
        let tokens: Vec<String> = (0..250).map(|i| format!("tok{}", i % 130)).collect();
        let freq = word_frequency(tokens.iter().map(String::as_str), 100);

        assert_eq!(freq.len(), 100);
        assert!(freq.windows(2).all(|w| w[0].count >= w[1].count));
        let unique: HashSet<&str> = freq.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(unique.len(), freq.len());
        // tok0..tok119 appear twice, tok120..tok129 once
        assert_eq!(freq[0].keyword, "tok0");
        assert_eq!(freq[0].count, 2);
    }

    #[test]
    fn groups_by_category_and_skips_unknown() {
        let records = vec![
            classified("waimai.meituan.com", &["美食", "特惠"]),
            classified("h5.ele.me", &["美食"]),
            classified("wqs.jd.com", &["领取"]),
            classified("unknownapp.xyz", &["垃圾"]),
            classified("m.kaola.com", &[]),
        ];
        let frequency = CategoryWordFrequency::build(&records, 100);

        let takeout = frequency.get(Category::Takeout).unwrap();
        assert_eq!(takeout[0], KeywordCount { keyword: "美食".into(), count: 2 });
        assert_eq!(takeout[1], KeywordCount { keyword: "特惠".into(), count: 1 });

        assert_eq!(frequency.get(Category::OnlineShopping).unwrap().len(), 1);
        assert!(frequency.get(Category::Unknown).is_none());
        assert_eq!(
            frequency.categories().collect::<Vec<_>>(),
            vec![Category::Takeout, Category::OnlineShopping]
        );
    }

    #[test]
    fn unclassified_records_are_ignored() {
        let record = AdEnvelopeRecord::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            vec!["美食".into()],
            "waimai.meituan.com",
        );
        let frequency = CategoryWordFrequency::build(&[record], 100);
        assert!(frequency.get(Category::Takeout).is_none());
    }
}
