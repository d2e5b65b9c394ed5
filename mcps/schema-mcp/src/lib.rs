//! Schema MCP Library
//!
//! Live PostgreSQL schema context and text-to-SQL tools over MCP.
//! Read-only by default; set `SCHEMA_MCP_ALLOW_WRITES=1` to allow writes.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use schema_mcp::SchemaMcpServer;
//!
//! let server = SchemaMcpServer::new()?;
//! // Serve via stdio or any other rmcp transport
//! ```

pub mod server;

pub use server::{ExecuteParams, GenerateParams, SchemaMcpServer};
