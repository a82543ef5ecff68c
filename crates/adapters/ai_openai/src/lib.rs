//! # cronpilot-adapter-ai-openai
//!
//! AI provider adapter for `OpenAI`-compatible chat completion APIs.
//!
//! ## Responsibilities
//! - Implement the `AiProvider` port defined in `cronpilot-app::ports`
//! - Translate completion options into a `/chat/completions` request
//! - Map HTTP and payload failures onto `ProviderError`
//!
//! ## Dependency rule
//! Depends on `cronpilot-app` (for the port trait) and `cronpilot-domain` (for errors).
//! The `app` and `domain` crates must never reference this adapter.

pub mod config;
mod provider;
mod wire;

pub use config::Config;
pub use provider::OpenAiProvider;
