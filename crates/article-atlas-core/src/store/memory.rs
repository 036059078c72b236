//! In-memory [`ArticleStore`] implementation for testing.
//!
//! Articles live in a `BTreeMap` keyed by id behind a `std::sync::RwLock`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{ArticleRecord, NewArticle};

use super::{matches_search, ArticlePage, ArticleStore};

/// In-memory store for tests.
pub struct InMemoryStore {
    articles: RwLock<BTreeMap<i64, ArticleRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store pre-populated with `records`, keeping their ids.
    pub fn with_records(records: impl IntoIterator<Item = ArticleRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            articles: RwLock::new(map),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn fetch_all(&self) -> Result<Vec<ArticleRecord>> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.get(&id).cloned())
    }

    async fn count(&self) -> Result<i64> {
        let articles = self.articles.read().map_err(poisoned)?;
        Ok(articles.len() as i64)
    }

    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<ArticlePage> {
        let articles = self.articles.read().map_err(poisoned)?;
        let items = articles
            .values()
            .filter(|a| search.map_or(true, |s| matches_search(a, s)))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(ArticlePage {
            items,
            total: articles.len() as i64,
        })
    }

    async fn insert(&self, article: &NewArticle) -> Result<i64> {
        let mut articles = self.articles.write().map_err(poisoned)?;
        let existing = article.doi.as_ref().and_then(|doi| {
            articles
                .values()
                .find(|a| a.doi.as_ref() == Some(doi))
                .map(|a| a.id)
        });
        let id = match existing {
            Some(id) => id,
            None => articles.keys().next_back().map_or(1, |max| max + 1),
        };
        articles.insert(id, article.clone().into_record(id));
        Ok(id)
    }
}
