//! chorus-core - fanout engine for the chorus service
//!
//! This crate provides:
//! - One adapter per hosted LLM vendor, normalizing heterogeneous request and
//!   response schemas into plain reply text
//! - The fanout orchestrator that asks every adapter concurrently and collects
//!   whatever settles
//! - The [`ProviderAdapter`] trait that ties the two together

pub mod fanout;
pub mod providers;

// Re-export main types for convenience
pub use fanout::Fanout;
pub use providers::types::ProviderAdapter;
pub use providers::{
    AnthropicAdapter, GoogleAdapter, OpenAiAdapter, OpenRouterAdapter,
};
