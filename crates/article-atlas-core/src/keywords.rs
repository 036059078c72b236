//! Keyword normalization and corpus-wide keyword frequency.
//!
//! Keyword fields are free text. Commas are the primary separator; a
//! comma-delimited piece that contains a semicolon is split again on
//! semicolons. Every resulting token is trimmed and lower-cased, and
//! empty tokens are dropped.

use std::collections::{BTreeSet, HashMap};

use crate::models::{ArticleRecord, KeywordCount};

/// Split a raw keyword field into normalized tokens, keeping duplicates
/// in the order they appear.
pub fn tokens(raw: Option<&str>) -> Vec<String> {
    let raw = raw.unwrap_or("");
    let mut out = Vec::new();
    for piece in raw.split(',') {
        if piece.contains(';') {
            out.extend(piece.split(';').filter_map(normalize_token));
        } else if let Some(t) = normalize_token(piece) {
            out.push(t);
        }
    }
    out
}

/// Normalize a raw keyword field into a set of distinct tokens.
pub fn normalize(raw: Option<&str>) -> BTreeSet<String> {
    tokens(raw).into_iter().collect()
}

fn normalize_token(piece: &str) -> Option<String> {
    let t = piece.trim().to_lowercase();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Count keyword occurrences across `articles` and return the `top_n`
/// most frequent, highest count first.
///
/// Duplicate tokens within one article each count. Ties keep the order in
/// which keywords were first encountered.
pub fn top_keywords(articles: &[ArticleRecord], top_n: usize) -> Vec<KeywordCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for article in articles {
        for kw in tokens(article.keywords.as_deref()) {
            match index.get(&kw) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(kw.clone(), counts.len());
                    counts.push(KeywordCount { keyword: kw, count: 1 });
                }
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}
