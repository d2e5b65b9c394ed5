//! PostgreSQL connections and raw query execution
//!
//! Every operation opens its own connection and closes it before returning.

pub mod ddl;
mod values;

pub use ddl::DdlAction;
pub use values::{row_to_map, text_to_json};

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor, Statement};

use crate::config::DatabaseConfig;
use crate::error::BridgeResult;
use crate::retry::{retry_with_delay, RetryPolicy};

const SAMPLE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL,
        email VARCHAR(100),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Result of executing arbitrary SQL
///
/// Serializes untagged: a JSON array of row objects, a status object, or an
/// error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows(Vec<Map<String, Value>>),
    Status { status: String, message: String },
    Error { error: String },
}

impl QueryOutcome {
    pub fn success() -> Self {
        QueryOutcome::Status {
            status: "success".to_string(),
            message: "Query executed successfully".to_string(),
        }
    }

    pub fn error(message: impl ToString) -> Self {
        QueryOutcome::Error {
            error: message.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryOutcome::Error { .. })
    }

    /// One-line summary for chat responses
    pub fn summary(&self) -> String {
        match self {
            QueryOutcome::Rows(rows) => format!("Returned {} row(s).", rows.len()),
            QueryOutcome::Status { message, .. } => message.clone(),
            QueryOutcome::Error { error } => format!("Error: {}", error),
        }
    }
}

/// Whether a connection may modify data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    /// Every transaction starts read-only, so the server rejects writes
    /// however the statement is phrased
    ReadOnly,
}

pub fn connect_options(config: &DatabaseConfig, access: Access) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password);

    match access {
        Access::ReadWrite => options,
        Access::ReadOnly => options.options([("default_transaction_read_only", "on")]),
    }
}

/// Open a read-write connection, retrying per the config's policy
pub async fn connect(config: &DatabaseConfig) -> BridgeResult<PgConnection> {
    connect_with_access(config, Access::ReadWrite).await
}

pub async fn connect_with_access(
    config: &DatabaseConfig,
    access: Access,
) -> BridgeResult<PgConnection> {
    let options = connect_options(config, access);
    let conn = retry_with_delay(RetryPolicy::from(config), "Database connection", || {
        PgConnection::connect_with(&options)
    })
    .await?;
    Ok(conn)
}

/// Close a connection, logging instead of failing
pub async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!("Error while closing database connection: {}", e);
    }
}

/// Execute arbitrary SQL on a fresh connection
///
/// Never fails: connection and execution errors come back as
/// [`QueryOutcome::Error`].
pub async fn execute_query(config: &DatabaseConfig, sql: &str) -> QueryOutcome {
    execute_with_access(config, Access::ReadWrite, sql).await
}

/// Like [`execute_query`], over a connection whose transactions are read-only
pub async fn execute_read_only(config: &DatabaseConfig, sql: &str) -> QueryOutcome {
    execute_with_access(config, Access::ReadOnly, sql).await
}

async fn execute_with_access(config: &DatabaseConfig, access: Access, sql: &str) -> QueryOutcome {
    let mut conn = match connect_with_access(config, access).await {
        Ok(conn) => conn,
        Err(e) => return QueryOutcome::error(e),
    };

    let result = run_sql(&mut conn, sql).await;
    close(conn).await;

    result.unwrap_or_else(|e| {
        tracing::warn!("Query failed: {}", e);
        QueryOutcome::error(e)
    })
}

async fn run_sql(conn: &mut PgConnection, sql: &str) -> BridgeResult<QueryOutcome> {
    // Multi-statement text cannot be prepared; fall back to whether rows came back
    let returns_rows = match (&mut *conn).prepare(sql).await {
        Ok(statement) => !statement.columns().is_empty(),
        Err(e) => {
            tracing::debug!("Could not prepare statement, executing directly: {}", e);
            false
        }
    };

    let rows = (&mut *conn).fetch_all(sqlx::raw_sql(sql)).await?;

    if returns_rows || !rows.is_empty() {
        let rows = rows.iter().map(row_to_map).collect::<BridgeResult<Vec<_>>>()?;
        Ok(QueryOutcome::Rows(rows))
    } else {
        Ok(QueryOutcome::success())
    }
}

/// Apply a schema-editing action
pub async fn apply_ddl(config: &DatabaseConfig, action: &DdlAction) -> BridgeResult<()> {
    let sql = action.to_sql()?;
    run_statement(config, &sql).await?;
    tracing::info!("{}", action.describe());
    Ok(())
}

/// Create the sample `users` table if it does not exist
pub async fn seed_sample(config: &DatabaseConfig) -> BridgeResult<()> {
    run_statement(config, SAMPLE_TABLE_SQL).await
}

async fn run_statement(config: &DatabaseConfig, sql: &str) -> BridgeResult<()> {
    let mut conn = connect(config).await?;
    let result = conn.execute(sqlx::raw_sql(sql)).await;
    close(conn).await;
    result?;
    Ok(())
}
