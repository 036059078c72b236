//! Bulk article import from a JSON file.
//!
//! The file holds a JSON array of article objects:
//!
//! ```json
//! [
//!   {
//!     "title": "Microgravity and bone loss in mice",
//!     "abstract": "...",
//!     "publication_date": "2021-04-12",
//!     "file_name": "PMC1234.pdf",
//!     "keywords": "microgravity, bone; mice",
//!     "citation_count": 14,
//!     "authors": "A. Author, B. Author",
//!     "doi": "10.1000/xyz"
//!   }
//! ]
//! ```
//!
//! Only `title` is required. Articles with a DOI that is already stored
//! replace the existing row.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

use article_atlas_core::models::NewArticle;
use article_atlas_core::store::ArticleStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse a JSON array of articles.
pub fn parse_articles(content: &str) -> Result<Vec<NewArticle>> {
    let articles: Vec<NewArticle> =
        serde_json::from_str(content).with_context(|| "Failed to parse article JSON")?;
    Ok(articles)
}

/// Insert `articles` into `store`, skipping entries with a blank title.
pub async fn import_articles<S: ArticleStore + ?Sized>(
    store: &S,
    articles: &[NewArticle],
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    for (i, article) in articles.iter().enumerate() {
        if article.title.trim().is_empty() {
            warn!(index = i, "skipping article with empty title");
            stats.skipped += 1;
            continue;
        }
        store
            .insert(article)
            .await
            .with_context(|| format!("Failed to insert article #{} ({})", i, article.title))?;
        stats.imported += 1;
    }
    Ok(stats)
}

/// CLI entry point for `atlas import`.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Import file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let articles = parse_articles(&content)?;

    let store = SqliteStore::new(db::connect(config).await?);
    let stats = import_articles(&store, &articles).await?;
    let total = store.count().await?;
    store.pool().close().await;

    info!(imported = stats.imported, skipped = stats.skipped, "import finished");
    println!("Import {}", path.display());
    println!("  imported articles: {}", stats.imported);
    println!("  skipped:           {}", stats.skipped);
    println!("  total in store:    {}", total);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use article_atlas_core::store::memory::InMemoryStore;

    #[test]
    fn parses_optional_fields() {
        let json = r#"[
            {"title": "A", "abstract": "x", "citation_count": 3, "keywords": "k1, k2"},
            {"title": "B"}
        ]"#;
        let parsed = parse_articles(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].abstract_text.as_deref(), Some("x"));
        assert_eq!(parsed[0].citation_count, Some(3));
        assert_eq!(parsed[1].publication_date, None);
    }

    #[test]
    fn rejects_non_array() {
        assert!(parse_articles(r#"{"title": "A"}"#).is_err());
    }

    #[tokio::test]
    async fn skips_blank_titles() {
        let store = InMemoryStore::new();
        let articles = vec![
            NewArticle {
                title: "Kept".into(),
                ..Default::default()
            },
            NewArticle {
                title: "  ".into(),
                ..Default::default()
            },
        ];
        let stats = import_articles(&store, &articles).await.unwrap();
        assert_eq!(stats, ImportStats { imported: 1, skipped: 1 });
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
