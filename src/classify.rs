//! Rule-based app category detection from advertiser domains.
//!
//! Rules are evaluated top to bottom and every matching rule overwrites the
//! category picked by an earlier one, so the last match wins.

use crate::record::Category;

pub const TAKEOUT_KEYWORDS: &[&str] = &["ele", "meituan", "waimai", "dianping.com", "kuaizi", "band"];
pub const MOBILE_GAME_KEYWORDS: &[&str] = &["play", "animal"];
pub const OFO_KEYWORDS: &[&str] = &["mobike", "ofo"];
pub const TAXI_KEYWORDS: &[&str] = &["xiaojukeji"];
pub const THIRD_PARTY_APP_KEYWORDS: &[&str] = &["weixin.qq.com"];
pub const FRUIT_TAKEOUT_KEYWORDS: &[&str] = &["xuxian", "fresh"];
pub const ONLINE_SHOPPING_KEYWORDS: &[&str] = &["dpurl", "xiaohong", "kaola", "jd"];
pub const FINANCE_KEYWORDS: &[&str] = &["tenpay"];
pub const MOVIE_KEYWORDS: &[&str] = &["dianying"];

#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub category: Category,
}

impl ClassificationRule {
    pub fn matches(&self, domain: &str) -> bool {
        self.keywords.iter().any(|kw| domain.contains(kw))
    }
}

/// Order matters: reordering changes which category wins for domains
/// matching several rules.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule { keywords: TAKEOUT_KEYWORDS, category: Category::Takeout },
    ClassificationRule { keywords: MOBILE_GAME_KEYWORDS, category: Category::MobileGame },
    ClassificationRule { keywords: OFO_KEYWORDS, category: Category::Ofo },
    ClassificationRule { keywords: TAXI_KEYWORDS, category: Category::Taxi },
    ClassificationRule { keywords: THIRD_PARTY_APP_KEYWORDS, category: Category::ThirdPartyApp },
    ClassificationRule { keywords: FRUIT_TAKEOUT_KEYWORDS, category: Category::FruitTakeout },
    ClassificationRule { keywords: ONLINE_SHOPPING_KEYWORDS, category: Category::OnlineShopping },
    ClassificationRule { keywords: FINANCE_KEYWORDS, category: Category::Finance },
    ClassificationRule { keywords: MOVIE_KEYWORDS, category: Category::Movie },
];

pub fn classify_domain(domain: &str) -> Category {
    CLASSIFICATION_RULES
        .iter()
        .fold(Category::Unknown, |current, rule| {
            if rule.matches(domain) {
                rule.category
            } else {
                current
            }
        })
}
