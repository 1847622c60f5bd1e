//! Fanout gateway — Axum-based HTTP server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use chorus_core::Fanout;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct GatewayState {
    pub fanout: Arc<Fanout>,
    pub start_time: Instant,
}

/// The gateway server
pub struct GatewayServer {
    state: GatewayState,
    bind: SocketAddr,
}

impl GatewayServer {
    /// Create a new gateway server
    pub fn new(bind: SocketAddr, fanout: Arc<Fanout>) -> Self {
        let state = GatewayState {
            fanout,
            start_time: Instant::now(),
        };
        Self { state, bind }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/ask", post(ask_handler))
            .route("/api/status", get(status_handler))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Gateway listening on {}", self.bind);

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background, returning a handle
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

// ── HTTP Handlers ──

/// POST /api/ask — fan one prompt out to every provider.
///
/// The body is read raw rather than through the `Json` extractor so that the
/// three failure classes keep their distinct responses: a body that is not
/// JSON at all gets the opaque 500, a JSON body without a usable `prompt`
/// gets the 400 validation payload, and only a non-empty string prompt
/// reaches the fanout. Total provider failure is still a 200 — the per-key
/// error strings are the contract, not HTTP status.
async fn ask_handler(
    State(state): State<GatewayState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            error!("ask error: malformed request body: {}", e);
            return internal_error();
        }
    };

    let prompt = match payload.get("prompt").and_then(Value::as_str) {
        Some(p) if !p.is_empty() => p,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing prompt"})),
            );
        }
    };

    let replies = state.fanout.ask_all(prompt).await;
    match serde_json::to_value(&replies) {
        Ok(map) => (StatusCode::OK, Json(map)),
        Err(e) => {
            error!("ask error: failed to serialize replies: {}", e);
            internal_error()
        }
    }
}

async fn status_handler(State(state): State<GatewayState>) -> Json<Value> {
    let providers: serde_json::Map<String, Value> = state
        .fanout
        .provider_status()
        .into_iter()
        .map(|(name, configured)| (name, Value::Bool(configured)))
        .collect();

    Json(json!({
        "status": "ok",
        "providers": providers,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal Server Error"})),
    )
}

/// Last line of defense: a panic that escapes a handler becomes the same
/// opaque 500 payload, with the detail kept server-side.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("handler panicked: {}", detail);
    internal_error().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chorus_core::ProviderAdapter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAdapter {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProviderAdapter for CountingAdapter {
        fn display_name(&self) -> &str {
            self.name
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn ask(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(anyhow!(msg)),
            }
        }
    }

    fn test_state(calls: &Arc<AtomicUsize>) -> GatewayState {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(CountingAdapter {
                name: "ChatGPT",
                reply: Ok("a"),
                calls: calls.clone(),
            }),
            Arc::new(CountingAdapter {
                name: "Claude",
                reply: Ok("b"),
                calls: calls.clone(),
            }),
            Arc::new(CountingAdapter {
                name: "Gemini",
                reply: Ok("c"),
                calls: calls.clone(),
            }),
            Arc::new(CountingAdapter {
                name: "MetaAI",
                reply: Ok("d"),
                calls: calls.clone(),
            }),
        ];
        GatewayState {
            fanout: Arc::new(Fanout::new(adapters)),
            start_time: Instant::now(),
        }
    }

    async fn post_ask(state: GatewayState, body: &str) -> (StatusCode, Value) {
        let (status, Json(value)) =
            ask_handler(State(state), Bytes::copy_from_slice(body.as_bytes())).await;
        (status, value)
    }

    #[tokio::test]
    async fn test_valid_prompt_returns_all_keys() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (status, value) = post_ask(test_state(&calls), r#"{"prompt":"hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map["ChatGPT"], "a");
        assert_eq!(map["MetaAI"], "d");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_prompt_is_400_without_fanout() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (status, value) = post_ask(test_state(&calls), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "Missing prompt"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_400_without_fanout() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (status, value) = post_ask(test_state(&calls), r#"{"prompt":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "Missing prompt"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_string_prompt_is_400() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (status, value) = post_ask(test_state(&calls), r#"{"prompt":42}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({"error": "Missing prompt"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_opaque_500() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (status, value) = post_ask(test_state(&calls), "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, json!({"error": "Internal Server Error"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_omits_key_but_stays_200() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(CountingAdapter {
                name: "ChatGPT",
                reply: Ok("a"),
                calls: calls.clone(),
            }),
            Arc::new(CountingAdapter {
                name: "Claude",
                reply: Err("connection refused"),
                calls: calls.clone(),
            }),
        ];
        let state = GatewayState {
            fanout: Arc::new(Fanout::new(adapters)),
            start_time: Instant::now(),
        };
        let (status, value) = post_ask(state, r#"{"prompt":"hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("ChatGPT"));
        assert!(!map.contains_key("Claude"));
    }

    #[tokio::test]
    async fn test_status_lists_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let Json(value) = status_handler(State(test_state(&calls))).await;
        assert_eq!(value["status"], "ok");
        assert_eq!(
            value["providers"],
            json!({"ChatGPT": true, "Claude": true, "Gemini": true, "MetaAI": true})
        );
    }
}
