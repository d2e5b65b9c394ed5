//! Schema-editing actions issued by the UI
//!
//! Each action validates its identifiers and column type before any SQL is
//! built, so raw user input never reaches the statement unquoted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{BridgeError, BridgeResult};

static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // PostgreSQL truncates identifiers at 63 bytes
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("Invalid identifier regex")
});

static COLUMN_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9 _]*(\(\s*\d+\s*(,\s*\d+\s*)?\))?(\[\])?$")
        .expect("Invalid column type regex")
});

/// A single schema change, tagged by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DdlAction {
    CreateTable {
        table_name: String,
    },
    DropTable {
        table_name: String,
    },
    AddColumn {
        table_name: String,
        column_name: String,
        column_type: String,
    },
    DropColumn {
        table_name: String,
        column_name: String,
    },
}

impl DdlAction {
    /// Build the statement for this action
    pub fn to_sql(&self) -> BridgeResult<String> {
        let sql = match self {
            DdlAction::CreateTable { table_name } => format!(
                "CREATE TABLE IF NOT EXISTS {} (id SERIAL PRIMARY KEY);",
                quote_identifier(table_name)?
            ),
            DdlAction::DropTable { table_name } => format!(
                "DROP TABLE IF EXISTS {} CASCADE;",
                quote_identifier(table_name)?
            ),
            DdlAction::AddColumn {
                table_name,
                column_name,
                column_type,
            } => format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                quote_identifier(table_name)?,
                quote_identifier(column_name)?,
                validate_column_type(column_type)?
            ),
            DdlAction::DropColumn {
                table_name,
                column_name,
            } => format!(
                "ALTER TABLE {} DROP COLUMN IF EXISTS {} CASCADE;",
                quote_identifier(table_name)?,
                quote_identifier(column_name)?
            ),
        };
        Ok(sql)
    }

    /// Short human description for logs and API responses
    pub fn describe(&self) -> String {
        match self {
            DdlAction::CreateTable { table_name } => format!("Created table {}", table_name),
            DdlAction::DropTable { table_name } => format!("Dropped table {}", table_name),
            DdlAction::AddColumn {
                table_name,
                column_name,
                ..
            } => format!("Added column {} to {}", column_name, table_name),
            DdlAction::DropColumn {
                table_name,
                column_name,
            } => format!("Dropped column {} from {}", column_name, table_name),
        }
    }
}

/// Validate and double-quote an identifier
pub fn quote_identifier(name: &str) -> BridgeResult<String> {
    if !IDENTIFIER_REGEX.is_match(name) {
        return Err(BridgeError::InvalidInput(format!(
            "'{}' is not a valid identifier",
            name
        )));
    }
    Ok(format!("\"{}\"", name))
}

/// Validate a column type such as `VARCHAR(255)` or `numeric(10, 2)` and uppercase it
pub fn validate_column_type(column_type: &str) -> BridgeResult<String> {
    let trimmed = column_type.trim();
    if !COLUMN_TYPE_REGEX.is_match(trimmed) {
        return Err(BridgeError::InvalidInput(format!(
            "'{}' is not a valid column type",
            column_type
        )));
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ui_payload() {
        let action: DdlAction = serde_json::from_str(
            r#"{"action": "add_column", "table_name": "users", "column_name": "age", "column_type": "INTEGER"}"#,
        )
        .unwrap();

        assert_eq!(
            action,
            DdlAction::AddColumn {
                table_name: "users".to_string(),
                column_name: "age".to_string(),
                column_type: "INTEGER".to_string(),
            }
        );
    }

    #[test]
    fn test_create_and_drop_table_sql() {
        let create = DdlAction::CreateTable {
            table_name: "new_table".to_string(),
        };
        assert_eq!(
            create.to_sql().unwrap(),
            r#"CREATE TABLE IF NOT EXISTS "new_table" (id SERIAL PRIMARY KEY);"#
        );

        let drop = DdlAction::DropTable {
            table_name: "new_table".to_string(),
        };
        assert_eq!(drop.to_sql().unwrap(), r#"DROP TABLE IF EXISTS "new_table" CASCADE;"#);
    }

    #[test]
    fn test_column_sql() {
        let add = DdlAction::AddColumn {
            table_name: "users".to_string(),
            column_name: "balance".to_string(),
            column_type: "numeric(10, 2)".to_string(),
        };
        assert_eq!(
            add.to_sql().unwrap(),
            r#"ALTER TABLE "users" ADD COLUMN "balance" NUMERIC(10, 2);"#
        );

        let drop = DdlAction::DropColumn {
            table_name: "users".to_string(),
            column_name: "balance".to_string(),
        };
        assert_eq!(
            drop.to_sql().unwrap(),
            r#"ALTER TABLE "users" DROP COLUMN IF EXISTS "balance" CASCADE;"#
        );
    }

    #[test]
    fn test_rejects_injection_in_identifiers() {
        for name in ["users; DROP TABLE x", "a\"b", "", "1abc", "name with space"] {
            assert!(quote_identifier(name).is_err(), "accepted {:?}", name);
        }
        assert!(quote_identifier(&"a".repeat(64)).is_err());
        assert!(quote_identifier(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_column_types() {
        assert_eq!(validate_column_type("VARCHAR(255)").unwrap(), "VARCHAR(255)");
        assert_eq!(
            validate_column_type("timestamp with time zone").unwrap(),
            "TIMESTAMP WITH TIME ZONE"
        );
        assert_eq!(validate_column_type("text[]").unwrap(), "TEXT[]");
        assert!(validate_column_type("INT; DROP TABLE users").is_err());
        assert!(validate_column_type("TEXT DEFAULT 'x'").is_err());
    }

    #[test]
    fn test_describe() {
        let action = DdlAction::DropColumn {
            table_name: "users".to_string(),
            column_name: "email".to_string(),
        };
        assert_eq!(action.describe(), "Dropped column email from users");
    }
}
