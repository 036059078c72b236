use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::db;

/// Create the article schema. Safe to run repeatedly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            abstract TEXT,
            publication_date TEXT,
            file_name TEXT,
            keywords TEXT,
            citation_count INTEGER NOT NULL DEFAULT 0,
            doi TEXT UNIQUE,
            authors TEXT
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_articles_publication_date ON articles(publication_date DESC)",
    )
    .execute(&pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title)")
        .execute(&pool)
        .await?;

    info!(path = %config.db.path.display(), "schema ready");
    pool.close().await;
    Ok(())
}
