//! chorus-gateway — HTTP surface for the chorus fanout
//!
//! Exposes the ask endpoint that the browser chat UI posts prompts to, and a
//! small status endpoint for health checks.

pub mod server;

pub use server::{GatewayServer, GatewayState};
