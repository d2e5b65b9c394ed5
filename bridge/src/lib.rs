//! SQL Bridge
//!
//! Introspects a live PostgreSQL schema, renders it as DDL context for a
//! language model, and turns natural-language questions into cleaned SQL.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sql_bridge::{config::BridgeConfig, llm::OllamaClient, prompt::SqlGenerator, schema};
//!
//! let config = BridgeConfig::load()?;
//! let generator = SqlGenerator::new(Arc::new(OllamaClient::new(&config.llm)?));
//! let schema = schema::current_schema(&config.database).await;
//! let sql = generator.generate_sql(&schema, "how many users signed up today?").await;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod web;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
