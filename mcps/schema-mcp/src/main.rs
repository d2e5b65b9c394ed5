//! Schema MCP Server
//!
//! Exposes the live database schema and text-to-SQL generation as MCP tools.
//!
//! Configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "schema": { "command": "./schema-mcp" } } }
//! ```

use rmcp::ServiceExt;
use schema_mcp::SchemaMcpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sql_bridge::logging::init_tracing("schema_mcp", "info")?;

    tracing::info!("Starting schema_mcp MCP Server");

    let server = SchemaMcpServer::new()?;
    let service = server.serve(rmcp::transport::stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
