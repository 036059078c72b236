//! PDF-grounded chat assistant.
//!
//! Answers a user question about one article. The article's PDF is read
//! from the configured PDF directory, its text is extracted and truncated,
//! and the result is sent to an OpenAI-compatible chat completions endpoint
//! together with the question.
//!
//! # Retry Strategy
//!
//! Completion requests are retried as follows:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, ... (capped at 2^5)

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use article_atlas_core::models::ArticleRecord;
use article_atlas_core::store::ArticleStore;

use crate::config::{ChatConfig, Config};
use crate::db;
use crate::pdf::{self, PdfError};
use crate::sqlite_store::SqliteStore;

const SYSTEM_PROMPT: &str = "You are a research assistant answering questions about a single \
scientific article. Base every answer on the article text provided. If the article does not \
contain the answer, say so plainly.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("article not found: {0}")]
    ArticleNotFound(i64),
    #[error("no PDF available for article {article_id}: {reason}")]
    PdfMissing { article_id: i64, reason: String },
    #[error("could not extract text for article {article_id}: {reason}")]
    Extraction { article_id: i64, reason: String },
    #[error("chat is disabled; set [chat] provider in config")]
    Disabled,
    #[error("language model request failed: {0}")]
    Llm(String),
    #[error("storage error: {0}")]
    Store(String),
}

/// Answer `message` about article `article_id`.
pub async fn chat<S: ArticleStore + ?Sized>(
    config: &Config,
    store: &S,
    article_id: i64,
    message: &str,
) -> Result<String, ChatError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let article = store
        .fetch_by_id(article_id)
        .await
        .map_err(|e| ChatError::Store(e.to_string()))?
        .ok_or(ChatError::ArticleNotFound(article_id))?;

    let text = article_text(config, &article).await?;
    let context = build_context(&article, &text, config.chat.max_context_chars);
    debug!(
        article_id,
        context_chars = context.chars().count(),
        "chat context built"
    );

    match config.chat.provider.as_str() {
        "openai" => complete_openai(&config.chat, &context, message).await,
        _ => Err(ChatError::Disabled),
    }
}

async fn article_text(config: &Config, article: &ArticleRecord) -> Result<String, ChatError> {
    let file_name = article
        .file_name
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ChatError::PdfMissing {
            article_id: article.id,
            reason: "article has no file".to_string(),
        })?;

    let bytes = pdf::read_pdf(&config.storage.pdf_dir, file_name)
        .await
        .map_err(|e| match e {
            PdfError::NotFound(_) | PdfError::InvalidName(_) => ChatError::PdfMissing {
                article_id: article.id,
                reason: e.to_string(),
            },
            other => ChatError::Extraction {
                article_id: article.id,
                reason: other.to_string(),
            },
        })?;

    // pdf-extract is CPU bound.
    let article_id = article.id;
    tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
        .await
        .map_err(|e| ChatError::Extraction {
            article_id,
            reason: e.to_string(),
        })?
        .map_err(|e| ChatError::Extraction {
            article_id,
            reason: e.to_string(),
        })
}

/// Title, abstract and body text, cut to `max_chars` characters.
pub fn build_context(article: &ArticleRecord, body: &str, max_chars: usize) -> String {
    let mut context = format!("Title: {}\n", article.title);
    if let Some(ref abs) = article.abstract_text {
        context.push_str(&format!("Abstract: {}\n", abs));
    }
    context.push_str("\nFull text:\n");
    context.push_str(body.trim());
    truncate_chars(&context, max_chars).to_string()
}

/// Longest prefix of `s` with at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

/// Call the chat completions API with retry/backoff.
async fn complete_openai(
    config: &ChatConfig,
    context: &str,
    message: &str,
) -> Result<String, ChatError> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| ChatError::Llm("OPENAI_API_KEY not set".to_string()))?;
    let model = config
        .model
        .as_ref()
        .ok_or_else(|| ChatError::Llm("chat.model required".to_string()))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ChatError::Llm(e.to_string()))?;

    let url = format!(
        "{}/v1/chat/completions",
        config.api_base.trim_end_matches('/')
    );
    let body = serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "system", "content": context },
            { "role": "user", "content": message },
        ],
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            warn!(attempt, delay_secs = delay.as_secs(), "retrying chat completion");
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| ChatError::Llm(e.to_string()))?;
                    info!(model = %model, "chat completion received");
                    return parse_completion(&json);
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(format!("API error {}: {}", status, body_text));
                    continue;
                }

                return Err(ChatError::Llm(format!("API error {}: {}", status, body_text)));
            }
            Err(e) => {
                last_err = Some(e.to_string());
                continue;
            }
        }
    }

    Err(ChatError::Llm(
        last_err.unwrap_or_else(|| "chat completion failed after retries".to_string()),
    ))
}

/// Extract `choices[0].message.content` from a completion response.
fn parse_completion(json: &serde_json::Value) -> Result<String, ChatError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ChatError::Llm("invalid response: missing choices[0].message.content".into()))
}

/// CLI entry point for `atlas chat`.
pub async fn run_chat(config: &Config, article_id: i64, message: &str) -> anyhow::Result<()> {
    let store = SqliteStore::new(db::connect(config).await?);
    let result = chat(config, &store, article_id, message).await;
    store.pool().close().await;

    match result {
        Ok(reply) => {
            println!("{}", reply);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use article_atlas_core::store::memory::InMemoryStore;

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn context_includes_title_and_abstract() {
        let mut a = ArticleRecord::new(1, "Bone loss");
        a.abstract_text = Some("Mice in orbit".into());
        let ctx = build_context(&a, "  body text  ", 1000);
        assert!(ctx.starts_with("Title: Bone loss\nAbstract: Mice in orbit\n"));
        assert!(ctx.ends_with("body text"));
        assert_eq!(build_context(&a, "body", 5), "Title");
    }

    #[test]
    fn parses_completion_content() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": " Yes. " } }]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Yes.");
        assert!(parse_completion(&serde_json::json!({})).is_err());
    }

    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve `/v1/chat/completions`, failing with `fail_with` for the first
    /// `failures` calls. Returns the base URL and the call counter.
    async fn mock_completions(failures: usize, fail_with: StatusCode) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<serde_json::Value>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        return (fail_with, Json(serde_json::json!({"error": "nope"})));
                    }
                    let question = body["messages"][2]["content"].as_str().unwrap_or("").to_string();
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({
                            "choices": [{ "message": { "content": format!("echo: {}", question) } }]
                        })),
                    )
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    fn openai_config(api_base: String) -> ChatConfig {
        std::env::set_var("OPENAI_API_KEY", "test-key");
        ChatConfig {
            provider: "openai".into(),
            model: Some("test-model".into()),
            api_base,
            max_retries: 1,
            timeout_secs: 5,
            ..ChatConfig::default()
        }
    }

    #[tokio::test]
    async fn completion_retries_server_errors() {
        let (base, calls) = mock_completions(1, StatusCode::SERVICE_UNAVAILABLE).await;
        let reply = complete_openai(&openai_config(base), "ctx", "why?")
            .await
            .unwrap();
        assert_eq!(reply, "echo: why?");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn completion_fails_fast_on_client_errors() {
        let (base, calls) = mock_completions(5, StatusCode::UNAUTHORIZED).await;
        let err = complete_openai(&openai_config(base), "ctx", "why?")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Llm(ref m) if m.contains("401")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let store = InMemoryStore::new();
        let err = chat(&Config::minimal(), &store, 1, "   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn unknown_article() {
        let store = InMemoryStore::new();
        let err = chat(&Config::minimal(), &store, 7, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::ArticleNotFound(7)));
    }

    #[tokio::test]
    async fn article_without_file() {
        let store = InMemoryStore::with_records(vec![ArticleRecord::new(1, "No pdf")]);
        let err = chat(&Config::minimal(), &store, 1, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::PdfMissing { article_id: 1, .. }));
    }

    #[tokio::test]
    async fn missing_pdf_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::minimal();
        cfg.storage.pdf_dir = dir.path().to_path_buf();
        let mut a = ArticleRecord::new(1, "Gone");
        a.file_name = Some("gone.pdf".into());
        let store = InMemoryStore::with_records(vec![a]);
        let err = chat(&cfg, &store, 1, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::PdfMissing { .. }));
    }
}
