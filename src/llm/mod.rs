//! LLM provider calls: chat completions, embeddings, query expansion, and
//! problem tagging. Providers ("ollama" or "openai"-compatible) are selected
//! by [`crate::config::LlmConfig`].

pub mod chat;
pub mod embeddings;
pub mod query_expand;
pub mod tags;
