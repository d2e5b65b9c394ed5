//! Prompt construction and response cleaning
//!
//! The live schema is rendered as `CREATE TABLE` statements and injected
//! into a fixed instruction template, so the model works from the actual
//! tables rather than from what it remembers.

mod template;

pub use template::{build_prompt, RULES};

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::llm::Llm;
use crate::schema::{ColumnDescription, Schema, TableDescription};

static SQL_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```sql\b\s*").expect("Invalid sql fence regex"));

// Any other fence. A known SQL dialect tag alone on the fence line goes too;
// anything else after the backticks is treated as code.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)```((?:postgresql|postgres|pgsql|psql|plpgsql|sqlite|mysql)[ \t]*\r?\n)?\s*",
    )
    .expect("Invalid fence regex")
});

/// Prefix of every error string returned by [`SqlGenerator::generate_sql`]
pub const ERROR_PREFIX: &str = "-- Error";

/// Render the schema as DDL, one statement per table, blank-line separated
///
/// Tables keep the order they have in `schema`. An empty schema renders as
/// an empty string.
pub fn render_ddl(schema: &Schema) -> String {
    schema
        .tables
        .iter()
        .map(render_table)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_table(table: &TableDescription) -> String {
    let columns = table
        .columns
        .iter()
        .map(render_column)
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE {} (\n    {}\n);", table.name, columns)
}

fn render_column(column: &ColumnDescription) -> String {
    let mut def = format!("{} {}", column.name, column.data_type);

    // PRIMARY KEY and REFERENCES are never shown together
    if column.is_pk {
        def.push_str(" PRIMARY KEY");
    } else if let Some(fk) = &column.fk {
        def.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
    }

    def
}

/// Strip markdown code fences and surrounding whitespace from model output
pub fn clean_response(text: &str) -> String {
    let text = SQL_FENCE_REGEX.replace_all(text, "");
    let text = FENCE_REGEX.replace_all(&text, "");
    text.trim().to_string()
}

/// Turns questions into SQL using an [`Llm`] backend
#[derive(Clone)]
pub struct SqlGenerator {
    llm: Arc<dyn Llm>,
}

impl SqlGenerator {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Generate SQL for `question` against `schema`
    ///
    /// Never fails: if the backend is unreachable, times out or errors, the
    /// result is a SQL comment starting with [`ERROR_PREFIX`].
    pub async fn generate_sql(&self, schema: &Schema, question: &str) -> String {
        let prompt = build_prompt(&render_ddl(schema), question);

        match self.llm.generate(&prompt).await {
            Ok(raw) => {
                let sql = clean_response(&raw);
                tracing::debug!(model = self.llm.model(), "Generated SQL: {}", sql);
                sql
            }
            Err(e) => {
                tracing::error!("LLM connection error: {}", e);
                format!("{} connecting to Local LLM: {}", ERROR_PREFIX, e)
            }
        }
    }
}
