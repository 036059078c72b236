//! Storage abstraction for Article Atlas.
//!
//! The [`ArticleStore`] trait is the only way ranking and listing code
//! reaches persisted articles, so backends are pluggable (SQLite in the
//! application crate, [`memory::InMemoryStore`] for tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ArticleRecord, NewArticle};

/// One page of a listing query.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub items: Vec<ArticleRecord>,
    /// Size of the whole corpus, not of the filtered result.
    pub total: i64,
}

/// Abstract article storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`fetch_all`](ArticleStore::fetch_all) | Snapshot of every article, for ranking |
/// | [`fetch_by_id`](ArticleStore::fetch_by_id) | Single article lookup |
/// | [`count`](ArticleStore::count) | Corpus size |
/// | [`list_page`](ArticleStore::list_page) | Offset/limit listing with optional text filter |
/// | [`insert`](ArticleStore::insert) | Add an article (upsert on DOI) |
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Every stored article, in id order.
    async fn fetch_all(&self) -> Result<Vec<ArticleRecord>>;

    /// The article with `id`, if any.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<ArticleRecord>>;

    /// Number of stored articles.
    async fn count(&self) -> Result<i64>;

    /// Articles in id order, skipping `offset` and returning up to `limit`.
    ///
    /// When `search` is set, only articles whose title or abstract contain
    /// it (case-insensitively) are returned.
    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<ArticlePage>;

    /// Insert an article and return its id. An article with the same DOI
    /// as an existing one replaces it in place and keeps the old id.
    async fn insert(&self, article: &NewArticle) -> Result<i64>;
}

/// Case-insensitive title/abstract substring match used by listing filters.
pub fn matches_search(article: &ArticleRecord, search: &str) -> bool {
    let needle = search.to_lowercase();
    article.title.to_lowercase().contains(&needle)
        || article
            .abstract_text
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(&needle))
}
