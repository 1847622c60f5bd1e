//! Per-vendor LLM adapters
//!
//! Supports OpenAI, Anthropic, Google Gemini, and Meta via OpenRouter.
//! Adapters implement the [`ProviderAdapter`] trait and are composed by
//! [`crate::Fanout`], which asks all of them concurrently.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod openrouter;
pub mod types;

pub use anthropic::AnthropicAdapter;
pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;
pub use openrouter::OpenRouterAdapter;
pub use types::ProviderAdapter;
