//! Schema introspection
//!
//! Builds a [`Schema`] from the live catalog on every request. Nothing is
//! cached. The JSON shape matches what the UI and the MCP tools consume:
//! `{id, name, columns: [{name, type, isPk, fk}]}`.

mod catalog;
mod introspect;

pub use catalog::{Catalog, CatalogColumn, CatalogForeignKey, PgCatalog};
pub use introspect::{current_schema, introspect};

use serde::{Deserialize, Serialize};

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    #[serde(rename = "col")]
    pub column: String,
}

/// A single column, as rendered into DDL context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    /// Normalized (uppercase) type name
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "isPk")]
    pub is_pk: bool,
    pub fk: Option<ForeignKeyRef>,
}

/// A table and its columns in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub id: String,
    pub name: String,
    pub columns: Vec<ColumnDescription>,
}

impl TableDescription {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescription>) -> Self {
        let name = name.into();
        Self {
            id: format!("tbl_{}", name),
            name,
            columns,
        }
    }
}

/// Every user-visible table in the namespace at introspection time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub tables: Vec<TableDescription>,
}

impl Schema {
    pub fn new(tables: Vec<TableDescription>) -> Self {
        Self { tables }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&TableDescription> {
        self.tables.iter().find(|t| t.name == name)
    }
}
