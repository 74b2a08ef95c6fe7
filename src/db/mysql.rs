use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow},
    MySqlPool, Row,
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

pub struct MySqlSchemaProvider {
    pub pool: MySqlPool,
    database_name: String,
}

impl MySqlSchemaProvider {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Self::from_pool(pool).await
    }

    pub async fn connect_with(config: &ConnectionConfig) -> Result<Self, DbError> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);
        if let Some(collation) = &config.collation {
            options = options.collation(collation);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("{}: {}", config.display_url(), e)))?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: MySqlPool) -> Result<Self, DbError> {
        let database_name: Option<String> = sqlx::query_scalar("SELECT CAST(DATABASE() AS CHAR)")
            .fetch_one(&pool)
            .await
            .map_err(DbError::Sqlx)?;

        let database_name = database_name
            .ok_or_else(|| DbError::Config("No database selected on MySQL connection".into()))?;

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
            SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(DATA_TYPE AS CHAR) AS data_type,
                   CAST(COLUMN_TYPE AS CHAR) AS column_type,
                   CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS char_length,
                   CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                   CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
                   CAST(EXTRA AS CHAR) AS extra
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
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
        row: &MySqlRow,
    ) -> Result<(String, ColumnDescriptor), DbError> {
        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);

        let name: String = row.try_get("column_name").map_err(err)?;
        let data_type: String = row.try_get("data_type").map_err(err)?;
        let column_type: String = row.try_get("column_type").map_err(err)?;
        let char_length: Option<i64> = row.try_get("char_length").map_err(err)?;
        let is_nullable: String = row.try_get("is_nullable").map_err(err)?;
        let default: Option<String> = row.try_get("column_default").map_err(err)?;
        let extra: Option<String> = row.try_get("extra").map_err(err)?;

        let logical = logical_type(&data_type, &column_type);
        let length = match logical {
            "string" | "binary" => char_length.and_then(|l| u32::try_from(l).ok()),
            _ => None,
        };
        let extra = extra.unwrap_or_default().to_ascii_lowercase();

        let column = ColumnDescriptor {
            column_type: logical.to_string(),
            length,
            nullable: is_nullable == "YES",
            default: normalize_default(default),
            unsigned: column_type.to_ascii_lowercase().contains("unsigned"),
            auto_increment: extra.contains("auto_increment"),
        };

        Ok((name, column))
    }

    async fn fetch_indexes(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, IndexDescriptor>, DbError> {
        let query = r#"
            SELECT CAST(INDEX_NAME AS CHAR) AS index_name,
                   CAST(NON_UNIQUE AS SIGNED) AS non_unique,
                   CAST(COLUMN_NAME AS CHAR) AS column_name,
                   CAST(SUB_PART AS SIGNED) AS sub_part,
                   CAST(INDEX_TYPE AS CHAR) AS index_type
            FROM information_schema.STATISTICS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY INDEX_NAME, SEQ_IN_INDEX
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::introspection(&self.database_name, table_name, e))?;

        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);
        let mut index_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            index_rows.push(IndexRow {
                index_name: row.try_get("index_name").map_err(err)?,
                non_unique: row.try_get::<i64, _>("non_unique").map_err(err)? != 0,
                column_name: row.try_get("column_name").map_err(err)?,
                sub_part: row.try_get("sub_part").map_err(err)?,
                index_type: row.try_get("index_type").map_err(err)?,
            });
        }

        Ok(assemble_indexes(index_rows))
    }

    async fn fetch_foreign_keys(
        &self,
        table_name: &str,
    ) -> Result<IndexMap<String, ForeignKeyDescriptor>, DbError> {
        let query = r#"
            SELECT CAST(k.CONSTRAINT_NAME AS CHAR) AS constraint_name,
                   CAST(k.COLUMN_NAME AS CHAR) AS column_name,
                   CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
                   CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name,
                   CAST(r.UPDATE_RULE AS CHAR) AS update_rule,
                   CAST(r.DELETE_RULE AS CHAR) AS delete_rule
            FROM information_schema.KEY_COLUMN_USAGE k
            JOIN information_schema.REFERENTIAL_CONSTRAINTS r
              ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
             AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME
             AND r.TABLE_NAME = k.TABLE_NAME
            WHERE k.TABLE_SCHEMA = DATABASE()
              AND k.TABLE_NAME = ?
              AND k.REFERENCED_TABLE_NAME IS NOT NULL
            ORDER BY k.CONSTRAINT_NAME, k.ORDINAL_POSITION
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::introspection(&self.database_name, table_name, e))?;

        let err = |e: sqlx::Error| DbError::introspection(&self.database_name, table_name, e);
        let mut key_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            key_rows.push(ForeignKeyRow {
                constraint_name: row.try_get("constraint_name").map_err(err)?,
                column_name: row.try_get("column_name").map_err(err)?,
                referenced_table_name: row.try_get("referenced_table_name").map_err(err)?,
                referenced_column_name: row.try_get("referenced_column_name").map_err(err)?,
                update_rule: row.try_get("update_rule").map_err(err)?,
                delete_rule: row.try_get("delete_rule").map_err(err)?,
            });
        }

        Ok(assemble_foreign_keys(table_name, key_rows))
    }
}

#[async_trait]
impl SchemaProvider for MySqlSchemaProvider {
    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn platform(&self) -> Platform {
        Platform::MySql
    }

    async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
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

/// One row of `information_schema.STATISTICS`.
#[derive(Debug, Clone)]
struct IndexRow {
    index_name: String,
    non_unique: bool,
    column_name: Option<String>,
    sub_part: Option<i64>,
    index_type: String,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone)]
struct ForeignKeyRow {
    constraint_name: String,
    column_name: String,
    referenced_table_name: String,
    referenced_column_name: String,
    update_rule: String,
    delete_rule: String,
}

fn logical_type(data_type: &str, column_type: &str) -> &'static str {
    match data_type.to_ascii_lowercase().as_str() {
        "tinyint" if column_type.to_ascii_lowercase().starts_with("tinyint(1)") => "boolean",
        "tinyint" | "smallint" => "smallint",
        "int" | "integer" | "mediumint" => "integer",
        "bigint" => "bigint",
        "bool" | "boolean" => "boolean",
        "decimal" | "numeric" => "decimal",
        "float" | "double" | "real" => "float",
        "char" | "varchar" | "enum" | "set" => "string",
        "tinytext" | "text" | "mediumtext" | "longtext" => "text",
        "binary" | "varbinary" => "binary",
        "tinyblob" | "blob" | "mediumblob" | "longblob" => "blob",
        "date" | "year" => "date",
        "datetime" | "timestamp" => "datetime",
        "time" => "time",
        "json" => "json",
        _ => "string",
    }
}

// MariaDB reports string defaults quoted and a missing default as `NULL`.
fn normalize_default(default: Option<String>) -> Option<String> {
    let default = default?;
    if default.eq_ignore_ascii_case("null") {
        return None;
    }

    match default
        .strip_prefix('\'')
        .and_then(|value| value.strip_suffix('\''))
    {
        Some(unquoted) => Some(unquoted.replace("''", "'")),
        None => Some(default),
    }
}

fn assemble_indexes(rows: Vec<IndexRow>) -> IndexMap<String, IndexDescriptor> {
    let mut lengths: IndexMap<String, Vec<Option<i64>>> = IndexMap::new();
    let mut indexes: IndexMap<String, IndexDescriptor> = IndexMap::new();

    for row in rows {
        let Some(column_name) = row.column_name else {
            // functional index parts have no column name
            continue;
        };

        let is_primary = row.index_name == "PRIMARY";
        let key = index_key(row.index_name, is_primary);
        let index = indexes
            .entry(key.clone())
            .or_insert_with(|| {
                let mut index = IndexDescriptor {
                    is_primary,
                    is_unique: !row.non_unique,
                    ..IndexDescriptor::default()
                };
                match row.index_type.to_ascii_uppercase().as_str() {
                    "FULLTEXT" => {
                        index.flags.insert("fulltext".to_string());
                    }
                    "SPATIAL" => {
                        index.flags.insert("spatial".to_string());
                    }
                    _ => {}
                }
                index
            });
        index.columns.push(column_name);
        lengths.entry(key).or_default().push(row.sub_part);
    }

    for (name, parts) in lengths {
        if parts.iter().any(Option::is_some) {
            if let Some(index) = indexes.get_mut(&name) {
                index
                    .options
                    .insert("lengths".to_string(), serde_json::json!(parts));
            }
        }
    }

    indexes
}

fn assemble_foreign_keys(
    table_name: &str,
    rows: Vec<ForeignKeyRow>,
) -> IndexMap<String, ForeignKeyDescriptor> {
    let mut keys: IndexMap<String, ForeignKeyDescriptor> = IndexMap::new();

    for row in rows {
        let key = keys
            .entry(row.constraint_name.clone())
            .or_insert_with(|| ForeignKeyDescriptor {
                local_table_name: table_name.to_string(),
                foreign_table_name: row.referenced_table_name.clone(),
                local_columns: Vec::new(),
                foreign_columns: Vec::new(),
                on_update: referential_action(&row.update_rule),
                on_delete: referential_action(&row.delete_rule),
            });
        key.local_columns.push(row.column_name);
        key.foreign_columns.push(row.referenced_column_name);
    }

    keys
}

/// MySQL treats `RESTRICT` and `NO ACTION` alike and uses them as the
/// implicit action, so both are reported as absent.
fn referential_action(rule: &str) -> Option<ReferentialAction> {
    match ReferentialAction::from_rule(rule) {
        Some(ReferentialAction::Restrict | ReferentialAction::NoAction) => None,
        action => action,
    }
}
