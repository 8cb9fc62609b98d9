//! # tasksmith
//!
//! An HTTP backend for generating and cataloging competitive programming
//! problems. Two LLM-driven pipelines sit behind one axum router:
//!
//! ```text
//!  Generation                           Search
//!  ──────────                           ──────
//!  ┌──────────────┐                     ┌──────────────┐
//!  │ TaskRequest   │                     │  User Query   │
//!  └──────┬───────┘                     └──────┬───────┘
//!         ▼                                    ▼
//!  ┌──────────────┐                     ┌──────────────┐
//!  │ LLM: 5-part   │                     │ LLM: expand   │ (cached)
//!  │ task content  │                     │ query terms   │
//!  └──────┬───────┘                     └──────┬───────┘
//!         ▼                                    ▼
//!  ┌──────────────┐                     ┌──────────────┐
//!  │ Parse + slug  │                     │ LLM: embed    │
//!  │ + test cases  │                     │ query+terms   │
//!  │ + PDF render  │                     └──────┬───────┘
//!  └──────┬───────┘                            ▼
//!         ▼                             ┌──────────────┐
//!  ┌──────────────┐                     │ DB RPC:       │
//!  │ Bundle: zip   │                     │ hybrid search │
//!  │ or storage    │                     └──────┬───────┘
//!  └──────────────┘                            ▼
//!                                        ranked problems
//! ```
//!
//! The update pipeline (`/v1/update-database`) hashes the problem content
//! into a stable id, asks the LLM for tags and an embedding, and upserts the
//! row; re-sending identical content is a no-op overwrite of the same row.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, LLM, database,
//!   storage, and subprocess bounds
//! - [`error`] - `ApiError` taxonomy and the uniform JSON error envelope
//! - [`models`] - Wire types: requests, responses, `ProblemRecord`,
//!   `TaskBundle`
//! - [`slug`] - Task/file name sanitization and unique-slug generation
//! - [`llm`] - Chat, embeddings, query expansion (cached), and tagging
//! - [`db`] - Problem catalog client: keyed upsert + hybrid-search RPC
//! - [`storage`] - Object storage client for task bundles
//! - [`generation`] - The generate → parse → test-cases → PDF → bundle
//!   pipeline
//! - [`update`] - The id → tags → embedding → upsert pipeline
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state built once at startup

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod generation;
pub mod llm;
pub mod models;
pub mod slug;
pub mod state;
pub mod storage;
pub mod update;
