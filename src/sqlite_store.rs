//! SQLite-backed [`ArticleStore`] implementation.
//!
//! Maps each store operation onto the `articles` table created by
//! [`migrate`](crate::migrate). Values that do not decode cleanly (for
//! example a non-numeric citation count) are read as absent rather than
//! failing the whole query.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use article_atlas_core::models::{ArticleRecord, NewArticle};
use article_atlas_core::store::{ArticlePage, ArticleStore};

const ARTICLE_COLUMNS: &str = "id, title, abstract, publication_date, file_name, keywords, \
                               citation_count, doi, authors";

/// SQLite implementation of the [`ArticleStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_article(row: &SqliteRow) -> ArticleRecord {
    ArticleRecord {
        id: row.get("id"),
        title: row.try_get("title").unwrap_or_default(),
        abstract_text: row.try_get("abstract").ok().flatten(),
        publication_date: row.try_get("publication_date").ok().flatten(),
        file_name: row.try_get("file_name").ok().flatten(),
        keywords: row.try_get("keywords").ok().flatten(),
        citation_count: row
            .try_get::<Option<i64>, _>("citation_count")
            .ok()
            .flatten()
            .unwrap_or(0)
            .max(0),
        authors: row.try_get("authors").ok().flatten(),
        doi: row.try_get("doi").ok().flatten(),
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn fetch_all(&self) -> Result<Vec<ArticleRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles ORDER BY id ASC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_article))
    }

    async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<ArticlePage> {
        let total = self.count().await?;

        let rows = match search {
            Some(s) => {
                let pattern = like_pattern(s);
                sqlx::query(&format!(
                    "SELECT {} FROM articles \
                     WHERE title LIKE ? ESCAPE '\\' OR abstract LIKE ? ESCAPE '\\' \
                     ORDER BY id ASC LIMIT ? OFFSET ?",
                    ARTICLE_COLUMNS
                ))
                .bind(&pattern)
                .bind(&pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM articles ORDER BY id ASC LIMIT ? OFFSET ?",
                    ARTICLE_COLUMNS
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(ArticlePage {
            items: rows.iter().map(row_to_article).collect(),
            total,
        })
    }

    async fn insert(&self, article: &NewArticle) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO articles (title, abstract, publication_date, file_name,
                                  keywords, citation_count, doi, authors)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(doi) DO UPDATE SET
                title = excluded.title,
                abstract = excluded.abstract,
                publication_date = excluded.publication_date,
                file_name = excluded.file_name,
                keywords = excluded.keywords,
                citation_count = excluded.citation_count,
                authors = excluded.authors
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.abstract_text)
        .bind(&article.publication_date)
        .bind(&article.file_name)
        .bind(&article.keywords)
        .bind(article.citation_count.unwrap_or(0).max(0))
        .bind(&article.doi)
        .bind(&article.authors)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
