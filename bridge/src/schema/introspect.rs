//! Assembling a [`Schema`] from catalog queries

use std::collections::{HashMap, HashSet};

use super::catalog::{Catalog, CatalogColumn, CatalogForeignKey, PgCatalog};
use super::{ColumnDescription, ForeignKeyRef, Schema, TableDescription};
use crate::config::DatabaseConfig;
use crate::db;
use crate::error::BridgeResult;

/// Introspect every base table in `namespace`
///
/// Any catalog failure aborts the whole run. An `Ok` with no tables means the
/// namespace really is empty; use [`current_schema`] for the fail-soft form.
pub async fn introspect<C>(catalog: &mut C, namespace: &str) -> BridgeResult<Schema>
where
    C: Catalog + ?Sized,
{
    let names = catalog.table_names(namespace).await?;
    let mut tables = Vec::with_capacity(names.len());

    for name in names {
        let columns = catalog.columns(namespace, &name).await?;
        let pks = catalog.primary_keys(namespace, &name).await?;
        let fks = catalog.foreign_keys(namespace, &name).await?;

        tables.push(TableDescription::new(name, assemble_columns(columns, &pks, fks)));
    }

    Ok(Schema::new(tables))
}

/// Introspect over a fresh connection, returning an empty schema on any failure
///
/// The connection is closed before returning on every path.
pub async fn current_schema(config: &DatabaseConfig) -> Schema {
    let mut conn = match db::connect(config).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Schema introspection failed to connect: {}", e);
            return Schema::default();
        }
    };

    let result = introspect(&mut PgCatalog::new(&mut conn), &config.namespace).await;
    db::close(conn).await;

    match result {
        Ok(schema) => {
            tracing::debug!("Introspected {} tables", schema.tables.len());
            schema
        }
        Err(e) => {
            tracing::error!("Schema introspection failed: {}", e);
            Schema::default()
        }
    }
}

fn assemble_columns(
    columns: Vec<CatalogColumn>,
    pks: &[String],
    fks: Vec<CatalogForeignKey>,
) -> Vec<ColumnDescription> {
    let pks: HashSet<&str> = pks.iter().map(String::as_str).collect();

    let mut edges: HashMap<String, ForeignKeyRef> = HashMap::new();
    for fk in fks {
        // first edge per column wins
        edges.entry(fk.column_name).or_insert(ForeignKeyRef {
            table: fk.foreign_table_name,
            column: fk.foreign_column_name,
        });
    }

    columns
        .into_iter()
        .map(|c| ColumnDescription {
            is_pk: pks.contains(c.column_name.as_str()),
            fk: edges.remove(&c.column_name),
            data_type: normalize_type(&c.data_type, &c.udt_name),
            name: c.column_name,
        })
        .collect()
}

/// Uppercase type name, resolving arrays and user-defined types via `udt_name`
fn normalize_type(data_type: &str, udt_name: &str) -> String {
    let resolved = match data_type {
        "ARRAY" => format!("{}[]", udt_name.trim_start_matches('_')),
        "USER-DEFINED" => udt_name.to_string(),
        other => other.to_string(),
    };
    resolved.to_uppercase()
}
