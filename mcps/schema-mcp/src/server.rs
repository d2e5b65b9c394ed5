//! Schema MCP Server implementation

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use sql_bridge::config::BridgeConfig;
use sql_bridge::db;
use sql_bridge::llm::OllamaClient;
use sql_bridge::prompt::{self, SqlGenerator};
use sql_bridge::schema;

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for generate_sql tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateParams {
    /// Natural-language question about the data, e.g. "how many orders shipped last week?"
    pub question: String,
}

/// Parameters for execute_sql tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteParams {
    /// SQL to execute. In read-only mode only SELECT/WITH/EXPLAIN/SHOW/VALUES/TABLE are allowed.
    pub sql: String,
}

fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Server Implementation
// ============================================================================

/// Schema MCP Server
#[derive(Clone)]
pub struct SchemaMcpServer {
    config: Arc<BridgeConfig>,
    generator: SqlGenerator,
    allow_writes: bool,
    tool_router: ToolRouter<Self>,
}

impl SchemaMcpServer {
    /// Create a server from the loaded config, read-only unless
    /// `SCHEMA_MCP_ALLOW_WRITES` is `1` or `true`
    pub fn new() -> anyhow::Result<Self> {
        let config = BridgeConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}. Using default.", e);
            BridgeConfig::default()
        });

        let allow_writes = std::env::var("SCHEMA_MCP_ALLOW_WRITES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let llm = OllamaClient::new(&config.llm)?;
        Ok(Self::with_generator(
            config,
            SqlGenerator::new(Arc::new(llm)),
            allow_writes,
        ))
    }

    pub fn with_generator(config: BridgeConfig, generator: SqlGenerator, allow_writes: bool) -> Self {
        Self {
            config: Arc::new(config),
            generator,
            allow_writes,
            tool_router: Self::tool_router(),
        }
    }

    /// Read-only mode opens connections whose transactions cannot write
    fn access(&self) -> db::Access {
        if self.allow_writes {
            db::Access::ReadWrite
        } else {
            db::Access::ReadOnly
        }
    }

    /// Cheap rejection of statements that obviously write. Not sufficient on
    /// its own: data-modifying CTEs start with WITH.
    fn is_read_only_query(sql: &str) -> bool {
        let normalized = sql.trim_start().to_uppercase();
        let single_statement = !sql.trim().trim_end_matches(';').contains(';');

        single_statement
            && ["SELECT", "WITH", "EXPLAIN", "SHOW", "VALUES", "TABLE"]
                .iter()
                .any(|kw| normalized.starts_with(kw))
    }
}

#[tool_router]
impl SchemaMcpServer {
    /// Return the live schema as JSON
    #[tool(description = "Get the live database schema: every table in the namespace with its columns, types, primary keys and foreign keys. Returns an empty list if the database is unreachable.")]
    async fn db_schema(&self) -> Result<CallToolResult, McpError> {
        let schema = schema::current_schema(&self.config.database).await;
        json_success(&schema)
    }

    /// Return the schema rendered as CREATE TABLE statements
    #[tool(description = "Get the live database schema rendered as CREATE TABLE statements, exactly as given to the SQL-generating model.")]
    async fn db_schema_ddl(&self) -> Result<CallToolResult, McpError> {
        let schema = schema::current_schema(&self.config.database).await;
        Ok(CallToolResult::success(vec![Content::text(prompt::render_ddl(
            &schema,
        ))]))
    }

    /// Turn a question into SQL
    #[tool(description = "Convert a natural-language question into PostgreSQL using the live schema as context. Returns raw SQL, or a SQL comment starting with '-- Error' if the model is unreachable. Does not execute anything.")]
    async fn generate_sql(
        &self,
        Parameters(params): Parameters<GenerateParams>,
    ) -> Result<CallToolResult, McpError> {
        let schema = schema::current_schema(&self.config.database).await;
        let sql = self.generator.generate_sql(&schema, &params.question).await;
        Ok(CallToolResult::success(vec![Content::text(sql)]))
    }

    /// Execute SQL and return rows or a status object
    #[tool(description = "Execute SQL against the database. Returns a JSON array of row objects, a status object, or an error object. In read-only mode (default), only single read statements are accepted and they run in a read-only transaction.")]
    async fn execute_sql(
        &self,
        Parameters(params): Parameters<ExecuteParams>,
    ) -> Result<CallToolResult, McpError> {
        if !self.allow_writes && !Self::is_read_only_query(&params.sql) {
            return Err(McpError::invalid_params(
                "Write operations are disabled. Set SCHEMA_MCP_ALLOW_WRITES=1 to enable.",
                None,
            ));
        }

        let outcome = match self.access() {
            db::Access::ReadWrite => db::execute_query(&self.config.database, &params.sql).await,
            db::Access::ReadOnly => db::execute_read_only(&self.config.database, &params.sql).await,
        };
        json_success(&outcome)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for SchemaMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mode = if self.allow_writes { "read-write" } else { "read-only" };
        ServerInfo {
            instructions: Some(format!(
                "PostgreSQL schema and text-to-SQL MCP server (model {}). Currently in {} mode. \
                Use db_schema or db_schema_ddl to inspect tables, generate_sql to draft a query \
                from a question, and execute_sql to run it.",
                self.generator.model(),
                mode
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
