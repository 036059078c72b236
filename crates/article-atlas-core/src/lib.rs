//! # Article Atlas Core
//!
//! Pure ranking and recommendation logic for a corpus of scientific
//! articles: keyword normalization and frequency, per-year counts,
//! trending selection, keyword-overlap similarity, and random sampling.
//!
//! Every operation is a synchronous function over a caller-supplied
//! snapshot of [`ArticleRecord`](models::ArticleRecord)s. This crate
//! contains no tokio, sqlx, or filesystem I/O; the application crate
//! fetches the snapshot through an [`ArticleStore`](store::ArticleStore)
//! and hands it over.
//!
//! Randomized operations take the random source as a parameter so tests
//! can pass a seeded `StdRng`.

pub mod error;
pub mod keywords;
pub mod models;
pub mod sample;
pub mod similarity;
pub mod store;
pub mod trending;
pub mod years;

pub use error::RankError;
pub use models::{ArticleRecord, KeywordCount, NewArticle, TrendingEntry, YearCount};
