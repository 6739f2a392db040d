//! Generator (LLM) abstraction for ScopeRAG.
//!
//! The answer assembler treats text generation as an opaque
//! `complete(request) -> response` call behind the [`LlmClient`] trait.
//! Retry policy belongs to callers, not to this crate.

pub mod client;
pub mod factory;
pub mod providers;

pub use client::{LlmClient, LlmRequest, LlmResponse};
pub use factory::create_client;
pub use providers::mock::MockClient;
