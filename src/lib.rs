//! # grammar_check
//!
//! Asynchronous grammar checking over HTTP, backed by an LLM.
//!
//! ## Task Flow
//! 1. Client submits text, receives a task id immediately
//! 2. A background tokio task asks the model for corrections, retrying
//!    transient upstream failures with exponential backoff
//! 3. The model output is parsed into [`grammar::Correction`] records
//! 4. The task is marked `completed` or `failed`; clients poll for it
//!
//! ```text
//!   POST /grammar-check ──▶ TaskManager::create ──▶ TaskStore (pending)
//!                                  │
//!                                  ▼ tokio::spawn
//!                           GrammarChecker::check
//!                    (retry ∘ LlmClient::complete ∘ parser)
//!                                  │
//!                                  ▼
//!                      TaskStore (completed | failed)
//!                                  ▲
//!   GET /grammar-check/status/{id} ┘
//! ```
//!
//! ## Modules
//! - `api`: axum router and handlers
//! - `config`: environment-driven configuration
//! - `grammar`: prompt, parser, retry executor and checker
//! - `llm`: completion client trait and implementations
//! - `tasks`: task records, store and lifecycle manager

pub mod api;
pub mod config;
pub mod grammar;
pub mod llm;
pub mod tasks;

pub use config::Config;
