//! Per-year bucketing of articles.
//!
//! Articles without a usable publication year are left out of every
//! bucket; they are not an error.

use std::collections::BTreeMap;

use crate::models::{ArticleRecord, YearBucket, YearCount};

/// Group articles by publication year, newest year first. Within a bucket
/// articles keep their input order.
pub fn group_by_year(articles: &[ArticleRecord]) -> Vec<YearBucket<'_>> {
    let mut by_year: BTreeMap<i32, Vec<&ArticleRecord>> = BTreeMap::new();
    for article in articles {
        if let Some(year) = article.publication_year() {
            by_year.entry(year).or_default().push(article);
        }
    }
    by_year
        .into_iter()
        .rev()
        .map(|(year, articles)| YearBucket { year, articles })
        .collect()
}

/// Article count per publication year, newest year first.
pub fn counts_by_year(articles: &[ArticleRecord]) -> Vec<YearCount> {
    group_by_year(articles)
        .into_iter()
        .map(|b| YearCount {
            year: b.year,
            count: b.articles.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(id: i64, date: Option<&str>) -> ArticleRecord {
        let mut a = ArticleRecord::new(id, format!("article {}", id));
        a.publication_date = date.map(str::to_string);
        a
    }

    #[test]
    fn counts_skip_undated_articles() {
        let corpus = vec![
            dated(1, Some("2020-01-05")),
            dated(2, Some("2020-07-19")),
            dated(3, Some("2021-02-01")),
            dated(4, None),
        ];
        assert_eq!(
            counts_by_year(&corpus),
            vec![
                YearCount { year: 2021, count: 1 },
                YearCount { year: 2020, count: 2 },
            ]
        );
    }

    #[test]
    fn years_strictly_descending_and_sum_matches_dated() {
        let corpus = vec![
            dated(1, Some("2015-01-01")),
            dated(2, Some("2023-01-01")),
            dated(3, Some("not a date")),
            dated(4, Some("2015-05-05")),
            dated(5, Some("2019-09-09")),
        ];
        let counts = counts_by_year(&corpus);
        assert!(counts.windows(2).all(|w| w[0].year > w[1].year));
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn buckets_keep_input_order() {
        let corpus = vec![
            dated(7, Some("2020-01-01")),
            dated(3, Some("2020-02-01")),
            dated(9, Some("2020-03-01")),
        ];
        let buckets = group_by_year(&corpus);
        assert_eq!(buckets.len(), 1);
        let ids: Vec<i64> = buckets[0].articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[test]
    fn empty_corpus_has_no_counts() {
        assert!(counts_by_year(&[]).is_empty());
    }
}
