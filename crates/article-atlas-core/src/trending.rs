//! Per-year "trending" article selection.
//!
//! # Algorithm
//!
//! 1. Drop articles without a usable publication year.
//! 2. Percentile threshold: sort all citation counts ascending and take the
//!    value at index `floor(n × min_percentile) − 1`, clamped to `[0, n−1]`
//!    (0 for an empty corpus). This is a nearest-rank pick that rounds the
//!    target rank down; it does not interpolate.
//! 3. Effective threshold = `max(min_citations, percentile threshold)`.
//! 4. Each year's champion is its most-cited article (first seen wins ties).
//! 5. **Thresholded** phase: walk years newest first, keeping champions that
//!    reach the threshold, until `years` entries are collected.
//! 6. **Backfilling** phase: if short, walk the years not yet taken, newest
//!    first, and append their champions regardless of threshold.
//!
//! Entries are returned in collection order: thresholded results first,
//! then backfilled ones.

use tracing::debug;

use crate::error::RankError;
use crate::models::{ArticleRecord, TrendingEntry};
use crate::years::group_by_year;

/// Upper bound for [`TrendingParams::years`].
pub const MAX_YEARS: usize = 10;

/// Tuning knobs for [`trending`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingParams {
    /// Number of years (entries) to return, `1..=10`.
    pub years: usize,
    /// Absolute citation floor.
    pub min_citations: i64,
    /// Percentile of the citation distribution used as a second floor, `[0, 1]`.
    pub min_percentile: f64,
}

impl Default for TrendingParams {
    fn default() -> Self {
        Self {
            years: 3,
            min_citations: 7,
            min_percentile: 0.5,
        }
    }
}

impl TrendingParams {
    /// Reject values outside the documented ranges.
    ///
    /// [`trending`] itself does not call this; it is for callers that
    /// prefer a 400 over silent clamping.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.years == 0 || self.years > MAX_YEARS {
            return Err(RankError::InvalidParameter(format!(
                "years must be in [1, {}], got {}",
                MAX_YEARS, self.years
            )));
        }
        if self.min_citations < 0 {
            return Err(RankError::InvalidParameter(format!(
                "min_citations must be >= 0, got {}",
                self.min_citations
            )));
        }
        if !(0.0..=1.0).contains(&self.min_percentile) {
            return Err(RankError::InvalidParameter(format!(
                "min_percentile must be in [0.0, 1.0], got {}",
                self.min_percentile
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Thresholded,
    Backfilling,
    Done,
}

/// Nearest-rank (round down) percentile of `counts`. Returns 0 when empty.
pub fn percentile_threshold(counts: &[i64], percentile: f64) -> i64 {
    if counts.is_empty() {
        return 0;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let n = sorted.len() as i64;
    let idx = ((n as f64 * percentile).floor() as i64 - 1).clamp(0, n - 1);
    sorted[idx as usize]
}

/// Select one trending article per recent year. See the module docs.
pub fn trending(articles: &[ArticleRecord], params: &TrendingParams) -> Vec<TrendingEntry> {
    let buckets = group_by_year(articles);
    if buckets.is_empty() {
        return Vec::new();
    }

    let counts: Vec<i64> = buckets
        .iter()
        .flat_map(|b| b.articles.iter().map(|a| a.citations()))
        .collect();
    let percentile = percentile_threshold(&counts, params.min_percentile);
    let threshold = params.min_citations.max(percentile);
    debug!(
        articles = counts.len(),
        percentile, threshold, "trending threshold computed"
    );

    // Buckets are newest first; champions follow the same order.
    let champions: Vec<(i32, &ArticleRecord)> = buckets
        .iter()
        .filter_map(|b| champion(&b.articles).map(|a| (b.year, a)))
        .collect();

    let mut taken = vec![false; champions.len()];
    let mut out: Vec<TrendingEntry> = Vec::with_capacity(params.years);
    let mut phase = Phase::Thresholded;

    loop {
        match phase {
            Phase::Thresholded => {
                for (i, (year, article)) in champions.iter().enumerate() {
                    if out.len() >= params.years {
                        break;
                    }
                    if article.citations() >= threshold {
                        out.push(TrendingEntry {
                            year: *year,
                            article: (*article).clone(),
                        });
                        taken[i] = true;
                    }
                }
                phase = if out.len() < params.years {
                    Phase::Backfilling
                } else {
                    Phase::Done
                };
            }
            Phase::Backfilling => {
                let before = out.len();
                for (i, (year, article)) in champions.iter().enumerate() {
                    if out.len() >= params.years {
                        break;
                    }
                    if !taken[i] {
                        out.push(TrendingEntry {
                            year: *year,
                            article: (*article).clone(),
                        });
                        taken[i] = true;
                    }
                }
                if out.len() > before {
                    debug!(backfilled = out.len() - before, "trending backfill");
                }
                phase = Phase::Done;
            }
            Phase::Done => break,
        }
    }

    out
}

/// Most-cited article in a bucket; the first one seen wins ties.
fn champion<'a>(articles: &[&'a ArticleRecord]) -> Option<&'a ArticleRecord> {
    let mut best: Option<&'a ArticleRecord> = None;
    for &a in articles {
        match best {
            Some(b) if a.citations() <= b.citations() => {}
            _ => best = Some(a),
        }
    }
    best
}
