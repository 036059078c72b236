//! Article records and the derived value types produced by ranking.
//!
//! Records are owned by the store; ranking code treats them as immutable
//! snapshots for the duration of one computation.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A stored article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Raw publication date as stored. Use [`ArticleRecord::publication_year`]
    /// to interpret it.
    pub publication_date: Option<String>,
    /// PDF file name relative to the configured PDF directory.
    pub file_name: Option<String>,
    /// Comma/semicolon separated keyword text.
    pub keywords: Option<String>,
    #[serde(default)]
    pub citation_count: i64,
    /// Free-text author list.
    pub authors: Option<String>,
    pub doi: Option<String>,
}

impl ArticleRecord {
    /// Minimal record with only an id and title set.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            abstract_text: None,
            publication_date: None,
            file_name: None,
            keywords: None,
            citation_count: 0,
            authors: None,
            doi: None,
        }
    }

    /// Calendar year of the publication date, or `None` when the date is
    /// absent or cannot be parsed.
    pub fn publication_year(&self) -> Option<i32> {
        self.publication_date.as_deref().and_then(parse_year)
    }

    /// Citation count clamped to be non-negative.
    pub fn citations(&self) -> i64 {
        self.citation_count.max(0)
    }
}

/// An article to be inserted; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub citation_count: Option<i64>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

impl NewArticle {
    /// Materialize as a record with the given id.
    pub fn into_record(self, id: i64) -> ArticleRecord {
        ArticleRecord {
            id,
            title: self.title,
            abstract_text: self.abstract_text,
            publication_date: self.publication_date,
            file_name: self.file_name,
            keywords: self.keywords,
            citation_count: self.citation_count.unwrap_or(0).max(0),
            authors: self.authors,
            doi: self.doi,
        }
    }
}

/// A normalized keyword and how often it occurs across the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Number of articles published in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Articles sharing one publication year.
#[derive(Debug, Clone)]
pub struct YearBucket<'a> {
    pub year: i32,
    pub articles: Vec<&'a ArticleRecord>,
}

/// One year's selected article in a trending result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingEntry {
    pub year: i32,
    pub article: ArticleRecord,
}

/// Composite sort key for similarity ranking. Ordered by shared keyword
/// count first, then citation count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimilarityScore {
    pub shared_keyword_count: usize,
    pub citation_count: i64,
}

fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
