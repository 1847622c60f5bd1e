//! The adapter contract shared by all vendors

use anyhow::Result;
use async_trait::async_trait;

/// Trait that all provider adapters implement.
///
/// An adapter resolves every *expected* failure mode to reply text: a missing
/// credential, a non-2xx upstream status, and a success body without the reply
/// field all come back as `Ok` with a fixed string. The only `Err` an adapter
/// may return is a transport-level failure (DNS, connect, reset, unreadable
/// body), which the fanout absorbs by dropping that provider's key.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Display name used as the key in the fanout result (e.g. "ChatGPT")
    fn display_name(&self) -> &str;

    /// Model identifier sent upstream (e.g. "gpt-4o-mini")
    fn model(&self) -> &str;

    /// Whether a credential was supplied at startup
    fn is_configured(&self) -> bool;

    /// Send one prompt and normalize the outcome to plain text
    async fn ask(&self, prompt: &str) -> Result<String>;
}

/// Fallback reply when a success body carries no text at the expected path
pub const NO_RESPONSE: &str = "No response.";
