//! Catalog queries behind a trait, so introspection can run against a fake

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection};

use crate::error::BridgeResult;

/// A column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogColumn {
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
}

/// One foreign-key edge: local column -> referenced table/column
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogForeignKey {
    pub column_name: String,
    pub foreign_table_name: String,
    pub foreign_column_name: String,
}

/// Read-only access to the metadata introspection needs
#[async_trait]
pub trait Catalog: Send {
    /// Base tables in `namespace`
    async fn table_names(&mut self, namespace: &str) -> BridgeResult<Vec<String>>;

    /// Columns of `table` in declaration order
    async fn columns(&mut self, namespace: &str, table: &str) -> BridgeResult<Vec<CatalogColumn>>;

    /// Names of the columns in `table`'s primary key
    async fn primary_keys(&mut self, namespace: &str, table: &str) -> BridgeResult<Vec<String>>;

    /// Foreign-key edges leaving `table`
    async fn foreign_keys(
        &mut self,
        namespace: &str,
        table: &str,
    ) -> BridgeResult<Vec<CatalogForeignKey>>;
}

// information_schema exposes sql_identifier/character_data domains; cast to
// text so they decode as String.
const TABLES_SQL: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = $1 AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

const COLUMNS_SQL: &str = r#"
    SELECT column_name::text AS column_name,
           data_type::text AS data_type,
           udt_name::text AS udt_name
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

const PRIMARY_KEYS_SQL: &str = r#"
    SELECT kcu.column_name::text
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON kcu.constraint_name = tc.constraint_name
     AND kcu.table_schema = tc.table_schema
     AND kcu.table_name = tc.table_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
      AND tc.table_schema = $1
      AND tc.table_name = $2
    ORDER BY kcu.ordinal_position
"#;

// pg_constraint keeps the local/referenced column pairing for composite keys,
// which information_schema.constraint_column_usage loses.
const FOREIGN_KEYS_SQL: &str = r#"
    SELECT a.attname::text AS column_name,
           rt.relname::text AS foreign_table_name,
           ra.attname::text AS foreign_column_name
    FROM pg_constraint c
    JOIN pg_class t ON t.oid = c.conrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_class rt ON rt.oid = c.confrelid
    CROSS JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(local_attnum, ref_attnum, ord)
    JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.local_attnum
    JOIN pg_attribute ra ON ra.attrelid = c.confrelid AND ra.attnum = k.ref_attnum
    WHERE c.contype = 'f'
      AND n.nspname = $1
      AND t.relname = $2
    ORDER BY c.conname, k.ord
"#;

/// [`Catalog`] over an open PostgreSQL connection
pub struct PgCatalog<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCatalog<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Catalog for PgCatalog<'_> {
    async fn table_names(&mut self, namespace: &str) -> BridgeResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(TABLES_SQL)
            .bind(namespace)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(names)
    }

    async fn columns(&mut self, namespace: &str, table: &str) -> BridgeResult<Vec<CatalogColumn>> {
        let columns = sqlx::query_as::<_, CatalogColumn>(COLUMNS_SQL)
            .bind(namespace)
            .bind(table)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(columns)
    }

    async fn primary_keys(&mut self, namespace: &str, table: &str) -> BridgeResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>(PRIMARY_KEYS_SQL)
            .bind(namespace)
            .bind(table)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(keys)
    }

    async fn foreign_keys(
        &mut self,
        namespace: &str,
        table: &str,
    ) -> BridgeResult<Vec<CatalogForeignKey>> {
        let edges = sqlx::query_as::<_, CatalogForeignKey>(FOREIGN_KEYS_SQL)
            .bind(namespace)
            .bind(table)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(edges)
    }
}
