//! Fanout orchestration
//!
//! Asks every configured provider the same prompt concurrently and collects
//! whatever settles. One slow or failing provider never aborts the others;
//! the join waits for all of them rather than racing for the first.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::providers::ProviderAdapter;

/// Fans one prompt out to every adapter and merges the settled outcomes
pub struct Fanout {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl Fanout {
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { adapters }
    }

    /// Display names of all registered adapters
    pub fn provider_names(&self) -> Vec<String> {
        self.adapters
            .iter()
            .map(|a| a.display_name().to_string())
            .collect()
    }

    /// Display name and configured state of each registered adapter
    pub fn provider_status(&self) -> Vec<(String, bool)> {
        self.adapters
            .iter()
            .map(|a| (a.display_name().to_string(), a.is_configured()))
            .collect()
    }

    /// Ask all adapters concurrently and collect the replies.
    ///
    /// Each adapter runs in its own task; the loop below awaits every handle,
    /// so the call returns only once all of them have settled. An adapter that
    /// resolved to text (including its own "not configured" / error strings)
    /// lands in the map under its display name. An adapter that returned a
    /// transport-level `Err`, or whose task panicked, is logged and its key
    /// omitted — callers treat an absent key as "no answer available".
    pub async fn ask_all(&self, prompt: &str) -> HashMap<String, String> {
        let mut handles = Vec::new();
        for adapter in &self.adapters {
            let adapter = adapter.clone();
            let prompt = prompt.to_string();
            handles.push(tokio::spawn(async move {
                let name = adapter.display_name().to_string();
                (name, adapter.ask(&prompt).await)
            }));
        }

        let mut replies = HashMap::new();
        for handle in handles {
            match handle.await {
                Ok((name, Ok(text))) => {
                    debug!("provider {} replied ({} bytes)", name, text.len());
                    replies.insert(name, text);
                }
                Ok((name, Err(e))) => {
                    warn!("provider {} dropped from response: {:#}", name, e);
                }
                Err(e) => {
                    warn!("provider task panicked: {}", e);
                }
            }
        }
        replies
    }
}
