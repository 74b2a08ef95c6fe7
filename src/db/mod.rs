use crate::{
    errors::DbError,
    models::{
        connections::{ConnectionConfig, DbType},
        schema::{Platform, TableDescriptor},
    },
};
use async_trait::async_trait;

pub mod dump;
pub mod mysql;
pub mod postgres;

/// Key of a table's primary key index. MySQL always names it `PRIMARY`
/// while PostgreSQL derives the name from the table, so both are stored
/// under this key and compare as the same index.
pub const PRIMARY_INDEX: &str = "primary";

pub(crate) fn index_key(name: String, is_primary: bool) -> String {
    if is_primary {
        PRIMARY_INDEX.to_string()
    } else {
        name
    }
}

/// Introspects one database into the schema model.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    fn database_name(&self) -> String;
    fn platform(&self) -> Platform;
    async fn list_tables(&self) -> Result<Vec<String>, DbError>;
    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor, DbError>;
}

/// Open a provider for the collected connection parameters.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn SchemaProvider>, DbError> {
    log::info!("Connecting to {} ({})", config.name, config.display_url());

    let provider: Box<dyn SchemaProvider> = match config.db_type {
        DbType::MySql => Box::new(mysql::MySqlSchemaProvider::connect_with(config).await?),
        DbType::Postgres => {
            Box::new(postgres::PostgresSchemaProvider::connect_with(config).await?)
        }
    };

    Ok(provider)
}

/// Open a provider from a `mysql://` or `postgres://` URL.
pub async fn connect_url(database_url: &str) -> Result<Box<dyn SchemaProvider>, DbError> {
    let provider: Box<dyn SchemaProvider> = match DbType::from_url(database_url)? {
        DbType::MySql => Box::new(mysql::MySqlSchemaProvider::connect(database_url).await?),
        DbType::Postgres => {
            Box::new(postgres::PostgresSchemaProvider::connect(database_url).await?)
        }
    };

    Ok(provider)
}
