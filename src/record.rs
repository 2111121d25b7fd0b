use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::classify::classify_domain;
use crate::keywords::TokenExtractor;

const LINK_MARKER: &str = "http";
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// App category an advertiser domain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "Takeout")]
    Takeout,
    #[serde(rename = "Mobile Game")]
    MobileGame,
    #[serde(rename = "OFO")]
    Ofo,
    #[serde(rename = "Taxi")]
    Taxi,
    #[serde(rename = "Third Party APP")]
    ThirdPartyApp,
    #[serde(rename = "Fruit Takeout")]
    FruitTakeout,
    #[serde(rename = "Online Shopping")]
    OnlineShopping,
    #[serde(rename = "Finance")]
    Finance,
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Category {
    /// Categories that receive aggregates. `Unknown` is left out on purpose
    /// so unclassified records never show up in any per-category output.
    pub const NAMED: [Category; 9] = [
        Category::Takeout,
        Category::MobileGame,
        Category::Ofo,
        Category::Taxi,
        Category::ThirdPartyApp,
        Category::FruitTakeout,
        Category::OnlineShopping,
        Category::Finance,
        Category::Movie,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Takeout => "Takeout",
            Category::MobileGame => "Mobile Game",
            Category::Ofo => "OFO",
            Category::Taxi => "Taxi",
            Category::ThirdPartyApp => "Third Party APP",
            Category::FruitTakeout => "Fruit Takeout",
            Category::OnlineShopping => "Online Shopping",
            Category::Finance => "Finance",
            Category::Movie => "Movie",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One input row as it comes out of a dataset source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    pub content: String,
    pub time: String,
}

impl RawRow {
    pub fn new(content: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            time: time.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("content has no embedded link")]
    NoLink,

    #[error("link has no host: {0}")]
    NoHost(String),

    #[error("invalid time of day: {0}")]
    InvalidTime(String),
}

/// A parsed red envelope announcement.
#[derive(Debug, Clone)]
pub struct AdEnvelopeRecord {
    pub time: NaiveTime,
    pub date: Option<NaiveDate>,
    pub keywords: Vec<String>,
    pub domain: String,
    /// Raw message the record was parsed from; pruning matches against it.
    pub content: String,
    category: OnceCell<Category>,
}

impl AdEnvelopeRecord {
    pub fn new(time: NaiveTime, keywords: Vec<String>, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            time,
            date: None,
            keywords,
            content: domain.clone(),
            domain,
            category: OnceCell::new(),
        }
    }

    /// Category assigned by [`classify`](Self::classify), `Unknown` before that.
    pub fn category(&self) -> Category {
        self.category.get().copied().unwrap_or(Category::Unknown)
    }

    pub fn is_classified(&self) -> bool {
        self.category.get().is_some()
    }

    /// Assigns the category from the domain. Only the first call computes it;
    /// later calls return the stored value.
    pub fn classify(&self) -> Category {
        *self.category.get_or_init(|| classify_domain(&self.domain))
    }
}

/// Turns one raw row into a record.
pub fn parse_record(
    row: &RawRow,
    extractor: &dyn TokenExtractor,
) -> Result<AdEnvelopeRecord, ParseError> {
    let link_start = row.content.find(LINK_MARKER).ok_or(ParseError::NoLink)?;
    let (ad_text, link) = row.content.split_at(link_start);

    let domain = extract_host(link).ok_or_else(|| ParseError::NoHost(link.to_string()))?;
    let time = parse_time_of_day(&row.time)?;

    let keywords = if ad_text.is_empty() {
        Vec::new()
    } else {
        extractor.extract(ad_text)
    };

    Ok(AdEnvelopeRecord {
        time,
        date: parse_date(&row.time),
        keywords,
        domain,
        content: row.content.clone(),
        category: OnceCell::new(),
    })
}

/// Host of the first link in `link`, as written in the message.
///
/// The link ends at the first whitespace. The host keeps its original case
/// so it stays a substring of the message it came from.
pub fn extract_host(link: &str) -> Option<String> {
    let link = link.split_whitespace().next()?;
    let url = Url::parse(link).ok()?;
    let parsed = url.host_str().filter(|host| !host.is_empty())?;
    Some(host_as_written(link).unwrap_or(parsed).to_string())
}

fn host_as_written(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("://")?;
    let authority = rest.split(['/', '?', '#', '\\']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if host_port.starts_with('[') {
        host_port.split_inclusive(']').next()?
    } else {
        host_port.split(':').next()?
    };
    (!host.is_empty()).then_some(host)
}

/// Parses the clock token following the date in `"<date> <HH:MM[:SS]>"`.
pub fn parse_time_of_day(datetime: &str) -> Result<NaiveTime, ParseError> {
    let clock = datetime
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ParseError::InvalidTime(datetime.to_string()))?;

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(clock, format).ok())
        .ok_or_else(|| ParseError::InvalidTime(datetime.to_string()))
}

pub fn parse_date(datetime: &str) -> Option<NaiveDate> {
    let day = datetime.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WordsExtractor;

    impl TokenExtractor for WordsExtractor {
        fn extract(&self, text: &str) -> Vec<String> {
            text.split_whitespace().map(str::to_string).collect()
        }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn splits_ad_text_and_link_at_first_http() {
        let row = RawRow::new(
            "美食 特惠 https://waimai.meituan.com/red?id=1 http://other.com",
            "2018-03-01 11:42",
        );
        let record = parse_record(&row, &WordsExtractor).unwrap();

        assert_eq!(record.domain, "waimai.meituan.com");
        assert_eq!(record.keywords, vec!["美食", "特惠"]);
        assert_eq!(record.time, hm(11, 42));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2018, 3, 1));
        assert_eq!(record.content, row.content);
    }

    #[test]
    fn row_without_link_is_unparsable() {
        let row = RawRow::new("no link here", "2018-03-01 11:42");
        assert_eq!(parse_record(&row, &WordsExtractor).unwrap_err(), ParseError::NoLink);
    }

    #[test]
    fn link_without_host_is_unparsable() {
        let row = RawRow::new("抢红包 httpnothing", "2018-03-01 11:42");
        assert!(matches!(
            parse_record(&row, &WordsExtractor),
            Err(ParseError::NoHost(_))
        ));
    }

    #[test]
    fn empty_ad_text_yields_no_keywords() {
        let row = RawRow::new("https://h5.ele.me/hongbao", "2018-03-01 08:05");
        let record = parse_record(&row, &WordsExtractor).unwrap();
        assert!(record.keywords.is_empty());
        assert_eq!(record.domain, "h5.ele.me");
    }

    #[test]
    fn time_accepts_seconds_and_rejects_garbage() {
        assert_eq!(
            parse_time_of_day("2018-03-01 23:31:15").unwrap(),
            NaiveTime::from_hms_opt(23, 31, 15).unwrap()
        );
        assert_eq!(parse_time_of_day("2018/3/1 0:29").unwrap(), hm(0, 29));
        assert!(parse_time_of_day("2018-03-01").is_err());
        assert!(parse_time_of_day("2018-03-01 25:99").is_err());
    }

    #[test]
    fn category_is_assigned_once() {
        let record = AdEnvelopeRecord::new(hm(12, 0), Vec::new(), "m.dianying.taobao.com");
        assert_eq!(record.category(), Category::Unknown);
        assert!(!record.is_classified());

        assert_eq!(record.classify(), Category::Movie);
        assert_eq!(record.classify(), Category::Movie);
        assert_eq!(record.category(), Category::Movie);
    }

    #[test]
    fn link_ends_at_whitespace() {
        let row = RawRow::new("饿了么红包 https://h5.ele.me 快来抢", "2018-03-01 11:00");
        let record = parse_record(&row, &WordsExtractor).unwrap();
        assert_eq!(record.domain, "h5.ele.me");
        assert_eq!(record.keywords, vec!["饿了么红包"]);
    }

    #[test]
    fn host_keeps_case_and_drops_port_and_userinfo() {
        assert_eq!(extract_host("https://H5.ELE.ME/x1").as_deref(), Some("H5.ELE.ME"));
        assert_eq!(
            extract_host("http://user:pw@m.kaola.com:8080/a?b=c").as_deref(),
            Some("m.kaola.com")
        );
        assert_eq!(extract_host("https://红包.中国/a").as_deref(), Some("红包.中国"));
        assert_eq!(extract_host("http:h5.ele.me").as_deref(), Some("h5.ele.me"));
        assert_eq!(extract_host("httpnothing"), None);
    }

    #[test]
    fn host_is_a_substring_of_its_message() {
        for content in [
            "红包 https://H5.ELE.ME/x1",
            "抢 https://Waimai.Meituan.com?id=3 快",
            "https://红包.中国/a",
        ] {
            let row = RawRow::new(content, "2018-03-01 11:00");
            let record = parse_record(&row, &WordsExtractor).unwrap();
            assert!(content.contains(&record.domain), "{}", record.domain);
        }
    }
}
