//! # Article Atlas
//!
//! A content-serving backend for a corpus of scientific articles:
//! paginated listing, detail retrieval, PDF delivery, a PDF-grounded chat
//! assistant, and a ranking & recommendation engine (top keywords, counts
//! per year, trending articles, similar articles, random picks).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ JSON import │──▶│    SQLite     │──▶│ article-atlas-core   │
//! └─────────────┘   │  (articles)   │   │ keywords / years /   │
//!                   └──────┬───────┘   │ trending / similar / │
//!                          │           │ sample               │
//!                          │           └──────────┬───────────┘
//!                 ┌────────┴─────────┬────────────┘
//!                 ▼                  ▼
//!            ┌──────────┐       ┌──────────┐      ┌─────────┐
//!            │   CLI    │       │   HTTP   │─────▶│ PDFs +  │
//!            │ (atlas)  │       │  (axum)  │      │ LLM chat│
//!            └──────────┘       └──────────┘      └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! atlas init                        # create database
//! atlas import articles.json        # load article metadata
//! atlas trending --years 3          # one trending article per year
//! atlas similar 42                  # keyword-similar articles
//! atlas serve                       # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite [`ArticleStore`](article_atlas_core::store::ArticleStore) |
//! | [`import`] | JSON article import |
//! | [`articles`] | Listing and detail views |
//! | [`ranking`] | Store-backed ranking operations |
//! | [`pdf`] | PDF delivery and text extraction |
//! | [`chat`] | PDF-grounded chat assistant |
//! | [`server`] | HTTP server |

pub mod articles;
pub mod chat;
pub mod config;
pub mod db;
pub mod import;
pub mod migrate;
pub mod pdf;
pub mod ranking;
pub mod server;
pub mod sqlite_store;
