//! Embedding providers.
//!
//! The index and the retrieval coordinator depend only on the
//! [`EmbeddingProvider`] trait; concrete providers are selected by
//! configuration. Index-time and query-time calls must go through the same
//! provider and model, or similarity scores are meaningless; switching
//! embedding models requires re-indexing from scratch.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
