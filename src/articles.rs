//! Article listing and detail retrieval.
//!
//! Shapes [`ArticleRecord`]s into the response types shared by the CLI
//! (`atlas list`, `atlas get`) and the HTTP server (`GET /articles`,
//! `GET /articles/{id}`).

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use article_atlas_core::models::ArticleRecord;
use article_atlas_core::store::ArticleStore;

use crate::config::{Config, ListingConfig};
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Compact article representation used in listings and rankings.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleListItem {
    pub id: i64,
    pub title: String,
    pub abstract_compressed: String,
    pub publication_date: Option<String>,
    pub keywords: Option<String>,
    pub citation_count: i64,
    pub author_names: Option<String>,
}

impl ArticleListItem {
    pub fn from_record(article: &ArticleRecord, preview_chars: usize) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            abstract_compressed: compress_abstract(article.abstract_text.as_deref(), preview_chars),
            publication_date: article.publication_date.clone(),
            keywords: article.keywords.clone(),
            citation_count: article.citations(),
            author_names: article.authors.clone(),
        }
    }
}

/// Full article view for `GET /articles/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    pub id: i64,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_date: Option<String>,
    pub file_name: Option<String>,
    pub keywords: Option<String>,
    pub citation_count: i64,
    pub author_names: Option<String>,
    pub doi: Option<String>,
}

impl From<ArticleRecord> for ArticleDetail {
    fn from(a: ArticleRecord) -> Self {
        let citation_count = a.citations();
        Self {
            id: a.id,
            title: a.title,
            abstract_text: a.abstract_text,
            publication_date: a.publication_date,
            file_name: a.file_name,
            keywords: a.keywords,
            citation_count,
            author_names: a.authors,
            doi: a.doi,
        }
    }
}

/// One page of articles plus the corpus size.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedArticles {
    pub items: Vec<ArticleListItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// First `max_chars` characters followed by `...` when the abstract is
/// longer; otherwise the abstract itself (or an empty string).
pub fn compress_abstract(text: Option<&str>, max_chars: usize) -> String {
    let text = text.unwrap_or("");
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Clamp a requested page/page size into the configured bounds.
pub fn normalize_paging(listing: &ListingConfig, page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let page_size = if page_size < 1 {
        listing.default_page_size
    } else {
        page_size.min(listing.max_page_size)
    };
    (page, page_size)
}

/// List one page of articles, optionally filtered by a title/abstract search.
pub async fn list_articles<S: ArticleStore + ?Sized>(
    store: &S,
    listing: &ListingConfig,
    page: i64,
    page_size: i64,
    query: Option<&str>,
) -> Result<PaginatedArticles> {
    let (page, page_size) = normalize_paging(listing, page, page_size);
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let offset = (page - 1).saturating_mul(page_size);

    let result = store.list_page(offset, page_size, query).await?;
    debug!(page, page_size, returned = result.items.len(), "listed articles");

    Ok(PaginatedArticles {
        items: result
            .items
            .iter()
            .map(|a| ArticleListItem::from_record(a, listing.abstract_preview_chars))
            .collect(),
        total: result.total,
        page,
        page_size,
    })
}

/// Fetch one article by id. Errors with `article not found` when missing.
pub async fn get_article<S: ArticleStore + ?Sized>(store: &S, id: i64) -> Result<ArticleDetail> {
    match store.fetch_by_id(id).await? {
        Some(a) => Ok(a.into()),
        None => bail!("article not found: {}", id),
    }
}

/// CLI entry point for `atlas list`.
pub async fn run_list(
    config: &Config,
    page: i64,
    page_size: Option<i64>,
    query: Option<String>,
) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let result = list_articles(
        &store,
        &config.listing,
        page,
        page_size.unwrap_or(config.listing.default_page_size),
        query.as_deref(),
    )
    .await?;
    store.pool().close().await;

    if result.items.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    let pages = (result.total + result.page_size - 1) / result.page_size;
    println!(
        "Page {}/{} ({} articles total)\n",
        result.page,
        pages.max(1),
        result.total
    );
    for item in &result.items {
        print_list_item(item);
    }
    Ok(())
}

/// CLI entry point for `atlas get`.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let result = get_article(&store, id).await;
    store.pool().close().await;

    let article = match result {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("--- Article ---");
    println!("id:               {}", article.id);
    println!("title:            {}", article.title);
    println!(
        "publication_date: {}",
        article.publication_date.as_deref().unwrap_or("(unknown)")
    );
    println!("citations:        {}", article.citation_count);
    if let Some(ref authors) = article.author_names {
        println!("authors:          {}", authors);
    }
    if let Some(ref kw) = article.keywords {
        println!("keywords:         {}", kw);
    }
    if let Some(ref doi) = article.doi {
        println!("doi:              {}", doi);
    }
    if let Some(ref file) = article.file_name {
        println!("file_name:        {}", file);
    }
    println!();
    println!("--- Abstract ---");
    println!("{}", article.abstract_text.as_deref().unwrap_or("(none)"));

    Ok(())
}

/// Print one list item in the two-line format shared by listing commands.
pub fn print_list_item(item: &ArticleListItem) {
    println!(
        "[{}] {} ({} citations, {})",
        item.id,
        item.title,
        item.citation_count,
        item.publication_date.as_deref().unwrap_or("undated")
    );
    if !item.abstract_compressed.is_empty() {
        println!("    {}", item.abstract_compressed);
    }
}
