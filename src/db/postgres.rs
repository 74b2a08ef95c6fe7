use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgRow},
    PgPool, Row,
};

use crate::{
    errors::DbError,
    models::{
        connections::ConnectionConfig,
        schema::{
            ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Platform,
            ReferentialAction, TableDescriptor,
        },
    },
};

use super::{index_key, SchemaProvider};

pub struct PostgresSchemaProvider {
    pub pool: PgPool,
    database_name: String,
}

impl PostgresSchemaProvider {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Self::from_pool(pool).await
    }

    pub async fn connect_with(config: &ConnectionConfig) -> Result<Self, DbError> {
        if let Some(collation) = &config.collation {
            log::debug!(
                "Ignoring collation {} for PostgreSQL connection {}",
                collation,
                config.name
            );
        }

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("{}: {}", config.display_url(), e)))?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, DbError> {
        let database_name: String = sqlx::query_scalar("SELECT current_database()::text")
            .fetch_one(&pool)
            .await
            .map_err(DbError::Sqlx)?;

        Ok(Self {
            pool,
            database_name,
        })
    }

    async fn fetch_columns(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ColumnDescriptor>, DbError> {
        let query = r#"
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   character_maximum_length::int4 AS char_length,
                   is_nullable::text AS is_nullable,
                   column_default::text AS column_default,
                   is_identity::text AS is_identity
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::introspection(&self.database_name, table_name, e))?;

        let mut columns = IndexMap::new();
        for row in &rows {
            let (name, column) = self.decode_column(table_name, row)?;
            columns.insert(name, column);
        }

        Ok(columns)
    }

    fn decode_column(
        &self,
        table_name: &str,
        row: &PgRow,
    ) -> Result<(String, ColumnDescriptor), DbError> {
        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);

        let name: String = row.try_get("column_name").map_err(err)?;
        let data_type: String = row.try_get("data_type").map_err(err)?;
        let char_length: Option<i32> = row.try_get("char_length").map_err(err)?;
        let is_nullable: String = row.try_get("is_nullable").map_err(err)?;
        let default: Option<String> = row.try_get("column_default").map_err(err)?;
        let is_identity: Option<String> = row.try_get("is_identity").map_err(err)?;

        let logical = logical_type(&data_type);
        let length = match logical {
            "string" | "binary" => char_length.and_then(|l| u32::try_from(l).ok()),
            _ => None,
        };

        let serial = default
            .as_deref()
            .is_some_and(|value| value.starts_with("nextval("));
        let auto_increment = serial || is_identity.as_deref() == Some("YES");

        let column = ColumnDescriptor {
            column_type: logical.to_string(),
            length,
            nullable: is_nullable == "YES",
            default: if serial { None } else { normalize_default(default) },
            unsigned: false,
            auto_increment,
        };

        Ok((name, column))
    }

    async fn fetch_indexes(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, IndexDescriptor>, DbError> {
        let query = r#"
            SELECT i.relname::text AS index_name,
                   ix.indisprimary AS is_primary,
                   ix.indisunique AS is_unique,
                   am.amname::text AS method,
                   pg_get_expr(ix.indpred, ix.indrelid) AS predicate,
                   ARRAY(
                       SELECT a.attname::text
                       FROM unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
                       JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
                       ORDER BY k.ord
                   ) AS columns
            FROM pg_index ix
            JOIN pg_class t ON t.oid = ix.indrelid
            JOIN pg_class i ON i.oid = ix.indexrelid
            JOIN pg_am am ON am.oid = i.relam
            JOIN pg_namespace n ON n.oid = t.relnamespace
            WHERE t.relname = $1 AND n.nspname = current_schema()
            ORDER BY i.relname
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::introspection(&self.database_name, table_name, e))?;

        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);
        let mut indexes = IndexMap::new();
        for row in &rows {
            let name: String = row.try_get("index_name").map_err(err)?;
            let method: String = row.try_get("method").map_err(err)?;
            let predicate: Option<String> = row.try_get("predicate").map_err(err)?;

            let mut index = IndexDescriptor {
                is_primary: row.try_get("is_primary").map_err(err)?,
                is_unique: row.try_get("is_unique").map_err(err)?,
                columns: row.try_get("columns").map_err(err)?,
                ..IndexDescriptor::default()
            };
            if method != "btree" {
                index
                    .options
                    .insert("method".to_string(), serde_json::Value::String(method));
            }
            if let Some(predicate) = predicate {
                index
                    .options
                    .insert("where".to_string(), serde_json::Value::String(predicate));
            }

            indexes.insert(index_key(name, index.is_primary), index);
        }

        Ok(indexes)
    }

    async fn fetch_foreign_keys(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ForeignKeyDescriptor>, DbError> {
        let query = r#"
            SELECT
                con.conname::text AS name,
                ref_class.relname::text AS referenced_table,
                array_agg(att.attname::text ORDER BY u.attposition) AS columns,
                array_agg(ref_att.attname::text ORDER BY u.attposition) AS referenced_columns,
                con.confupdtype,
                con.confdeltype
            FROM pg_constraint con
            JOIN pg_class class ON con.conrelid = class.oid
            JOIN pg_class ref_class ON con.confrelid = ref_class.oid
            JOIN pg_namespace n ON n.oid = class.relnamespace
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
                WITH ORDINALITY AS u(attnum, ref_attnum, attposition)
            JOIN pg_attribute att ON att.attrelid = class.oid AND att.attnum = u.attnum
            JOIN pg_attribute ref_att
              ON ref_att.attrelid = ref_class.oid AND ref_att.attnum = u.ref_attnum
            WHERE class.relname = $1 AND n.nspname = current_schema() AND con.contype = 'f'
            GROUP BY con.conname, ref_class.relname, con.confupdtype, con.confdeltype
            ORDER BY con.conname
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::introspection(&self.database_name, table_name, e))?;

        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);
        let mut keys = IndexMap::new();
        for row in &rows {
            let name: String = row.try_get("name").map_err(err)?;
            let confupdtype: i8 = row.try_get("confupdtype").map_err(err)?;
            let confdeltype: i8 = row.try_get("confdeltype").map_err(err)?;

            keys.insert(
                name,
                ForeignKeyDescriptor {
                    local_table_name: table_name.to_string(),
                    foreign_table_name: row.try_get("referenced_table").map_err(err)?,
                    local_columns: row.try_get("columns").map_err(err)?,
                    foreign_columns: row.try_get("referenced_columns").map_err(err)?,
                    on_update: referential_action(confupdtype as u8 as char),
                    on_delete: referential_action(confdeltype as u8 as char),
                },
            );
        }

        Ok(keys)
    }
}

#[async_trait]
impl SchemaProvider for PostgresSchemaProvider {
    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn platform(&self) -> Platform {
        Platform::Postgres
    }

    async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let query = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::table_list(&self.database_name, e))?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::table_list(&self.database_name, e))?;

        log::debug!("{} lists {} tables", self.database_name, tables.len());
        Ok(tables)
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor, DbError> {
        log::trace!("Describing {}.{}", self.database_name, table_name);

        let columns = self.fetch_columns(table_name).await?;
        if columns.is_empty() {
            return Err(DbError::TableNotFound {
                database: self.database_name.clone(),
                table: table_name.to_string(),
            });
        }

        Ok(TableDescriptor {
            name: table_name.to_string(),
            columns,
            indexes: self.fetch_indexes(table_name).await?,
            foreign_keys: self.fetch_foreign_keys(table_name).await?,
        })
    }
}

fn logical_type(data_type: &str) -> &'static str {
    match data_type {
        "integer" => "integer",
        "bigint" => "bigint",
        "smallint" => "smallint",
        "boolean" => "boolean",
        "character varying" | "character" => "string",
        "text" => "text",
        "numeric" => "decimal",
        "real" | "double precision" => "float",
        "date" => "date",
        "timestamp without time zone" => "datetime",
        "timestamp with time zone" => "datetimetz",
        "time without time zone" | "time with time zone" => "time",
        "json" | "jsonb" => "json",
        "uuid" => "guid",
        "bytea" => "blob",
        _ => "string",
    }
}

/// Strip the `::type` cast and quoting PostgreSQL adds to literal defaults.
fn normalize_default(default: Option<String>) -> Option<String> {
    let default = default?;

    if let Some(rest) = default.strip_prefix('\'') {
        let mut literal = String::new();
        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                literal.push(c);
                continue;
            }
            if let Some((_, '\'')) = chars.peek() {
                chars.next();
                literal.push('\'');
                continue;
            }
            let tail = &rest[i + 1..];
            if tail.is_empty() || tail.starts_with("::") {
                return Some(literal);
            }
            break;
        }
        return Some(default);
    }

    match default.split_once("::") {
        Some((value, _)) if value.eq_ignore_ascii_case("null") => None,
        _ => Some(default),
    }
}

/// `NO ACTION` is PostgreSQL's implicit action, so it is reported as absent.
fn referential_action(code: char) -> Option<ReferentialAction> {
    match code {
        'r' => Some(ReferentialAction::Restrict),
        'c' => Some(ReferentialAction::Cascade),
        'n' => Some(ReferentialAction::SetNull),
        'd' => Some(ReferentialAction::SetDefault),
        _ => None,
    }
}
