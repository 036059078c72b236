//! Store-backed ranking operations.
//!
//! Each function takes one snapshot of the corpus via
//! [`ArticleStore::fetch_all`] and hands it to the pure engine in
//! `article_atlas_core`. Nothing is cached; every call recomputes.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use article_atlas_core::keywords::top_keywords;
use article_atlas_core::models::{KeywordCount, YearCount};
use article_atlas_core::sample::sample;
use article_atlas_core::similarity::similar;
use article_atlas_core::store::ArticleStore;
use article_atlas_core::trending::{trending, TrendingParams};
use article_atlas_core::years::counts_by_year;

use crate::articles::{print_list_item, ArticleListItem};
use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// A trending entry as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingItem {
    pub year: i32,
    pub article: ArticleListItem,
}

/// A random sample and the size of the corpus it was drawn from.
#[derive(Debug, Clone, Serialize)]
pub struct RandomSample {
    pub items: Vec<ArticleListItem>,
    pub total: usize,
}

pub async fn keywords<S: ArticleStore + ?Sized>(store: &S, limit: usize) -> Result<Vec<KeywordCount>> {
    let snapshot = store.fetch_all().await?;
    let top = top_keywords(&snapshot, limit);
    debug!(articles = snapshot.len(), keywords = top.len(), "top keywords");
    Ok(top)
}

pub async fn year_counts<S: ArticleStore + ?Sized>(store: &S) -> Result<Vec<YearCount>> {
    let snapshot = store.fetch_all().await?;
    Ok(counts_by_year(&snapshot))
}

pub async fn trending_articles<S: ArticleStore + ?Sized>(
    store: &S,
    params: &TrendingParams,
    preview_chars: usize,
) -> Result<Vec<TrendingItem>> {
    let snapshot = store.fetch_all().await?;
    Ok(trending(&snapshot, params)
        .into_iter()
        .map(|e| TrendingItem {
            year: e.year,
            article: ArticleListItem::from_record(&e.article, preview_chars),
        })
        .collect())
}

/// Articles similar to `id`. A missing target surfaces as
/// [`RankError::NotFound`](article_atlas_core::RankError::NotFound)
/// inside the returned error.
pub async fn similar_articles<S: ArticleStore + ?Sized>(
    store: &S,
    id: i64,
    limit: usize,
    preview_chars: usize,
) -> Result<Vec<ArticleListItem>> {
    let snapshot = store.fetch_all().await?;
    let found = {
        let mut rng = rand::thread_rng();
        similar(id, &snapshot, limit, &mut rng)?
    };
    Ok(found
        .iter()
        .map(|a| ArticleListItem::from_record(a, preview_chars))
        .collect())
}

pub async fn random_articles<S: ArticleStore + ?Sized>(
    store: &S,
    limit: usize,
    preview_chars: usize,
) -> Result<RandomSample> {
    let snapshot = store.fetch_all().await?;
    let (items, total) = {
        let mut rng = rand::thread_rng();
        sample(&snapshot, limit, &mut rng)
    };
    Ok(RandomSample {
        items: items
            .iter()
            .map(|a| ArticleListItem::from_record(a, preview_chars))
            .collect(),
        total,
    })
}

// ============ CLI entry points ============

async fn open_store(config: &Config) -> Result<SqliteStore> {
    Ok(SqliteStore::new(db::connect(config).await?))
}

pub async fn run_keywords(config: &Config, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.ranking.keyword_limit);
    article_atlas_core::error::validate_limit("limit", limit)?;
    let store = open_store(config).await?;
    let top = keywords(&store, limit).await?;
    store.pool().close().await;

    if top.is_empty() {
        println!("No keywords.");
        return Ok(());
    }
    for (rank, kc) in top.iter().enumerate() {
        println!("{:>3}. {:<40} {}", rank + 1, kc.keyword, kc.count);
    }
    Ok(())
}

pub async fn run_years(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let counts = year_counts(&store).await?;
    store.pool().close().await;

    if counts.is_empty() {
        println!("No dated articles.");
        return Ok(());
    }
    for yc in &counts {
        println!("{}  {}", yc.year, yc.count);
    }
    Ok(())
}

pub async fn run_trending(config: &Config, params: TrendingParams) -> Result<()> {
    params.validate()?;
    let store = open_store(config).await?;
    let entries =
        trending_articles(&store, &params, config.listing.abstract_preview_chars).await?;
    store.pool().close().await;

    if entries.is_empty() {
        println!("No trending articles.");
        return Ok(());
    }
    for e in &entries {
        print!("{}: ", e.year);
        print_list_item(&e.article);
    }
    Ok(())
}

pub async fn run_similar(config: &Config, id: i64, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.ranking.similar_limit);
    article_atlas_core::error::validate_limit("limit", limit)?;
    let store = open_store(config).await?;
    let result = similar_articles(&store, id, limit, config.listing.abstract_preview_chars).await;
    store.pool().close().await;

    let items = match result {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if items.is_empty() {
        println!("No similar articles.");
        return Ok(());
    }
    for item in &items {
        print_list_item(item);
    }
    Ok(())
}

pub async fn run_random(config: &Config, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.ranking.random_limit);
    article_atlas_core::error::validate_limit("limit", limit)?;
    let store = open_store(config).await?;
    let result = random_articles(&store, limit, config.listing.abstract_preview_chars).await?;
    store.pool().close().await;

    println!("{} of {} articles:\n", result.items.len(), result.total);
    for item in &result.items {
        print_list_item(item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use article_atlas_core::models::ArticleRecord;
    use article_atlas_core::store::memory::InMemoryStore;
    use article_atlas_core::RankError;

    fn art(id: i64, kw: &str, date: &str, citations: i64) -> ArticleRecord {
        let mut a = ArticleRecord::new(id, format!("article {}", id));
        a.keywords = Some(kw.to_string());
        a.publication_date = Some(date.to_string());
        a.citation_count = citations;
        a
    }

    fn store() -> InMemoryStore {
        InMemoryStore::with_records(vec![
            art(1, "mars, dust", "2021-01-01", 12),
            art(2, "mars; ice", "2022-01-01", 3),
            art(3, "moon", "2022-05-01", 9),
        ])
    }

    #[tokio::test]
    async fn keywords_from_store() {
        let top = keywords(&store(), 1).await.unwrap();
        assert_eq!(top, vec![KeywordCount { keyword: "mars".into(), count: 2 }]);
    }

    #[tokio::test]
    async fn trending_maps_to_list_items() {
        let items = trending_articles(&store(), &TrendingParams::default(), 50)
            .await
            .unwrap();
        let got: Vec<(i32, i64)> = items.iter().map(|i| (i.year, i.article.id)).collect();
        assert_eq!(got, vec![(2022, 3), (2021, 1)]);
    }

    #[tokio::test]
    async fn similar_unknown_id_carries_rank_error() {
        let err = similar_articles(&store(), 99, 3, 50).await.unwrap_err();
        assert_eq!(err.downcast_ref::<RankError>(), Some(&RankError::NotFound(99)));
    }

    #[tokio::test]
    async fn random_reports_total() {
        let s = random_articles(&store(), 2, 50).await.unwrap();
        assert_eq!(s.items.len(), 2);
        assert_eq!(s.total, 3);
    }
}
