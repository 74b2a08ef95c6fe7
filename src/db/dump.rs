use std::{fs, path::Path};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    errors::DbError,
    models::schema::{Platform, TableDescriptor},
};

use super::SchemaProvider;

/// A whole schema held in memory, usually read from a JSON file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SchemaDump {
    pub database_name: String,
    pub platform: Platform,
    #[serde(with = "tables_as_list")]
    pub tables: IndexMap<String, TableDescriptor>,
}

impl SchemaDump {
    pub fn new(database_name: impl Into<String>, platform: Platform) -> Self {
        Self {
            database_name: database_name.into(),
            platform,
            tables: IndexMap::new(),
        }
    }

    pub fn with_table(mut self, table: TableDescriptor) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Read every table of a live provider.
    pub async fn capture(provider: &dyn SchemaProvider) -> Result<Self, DbError> {
        let mut dump = Self::new(provider.database_name(), provider.platform());

        for table_name in provider.list_tables().await? {
            log::debug!("Capturing {}.{}", dump.database_name, table_name);
            let table = provider.describe_table(&table_name).await?;
            dump.tables.insert(table_name, table);
        }

        Ok(dump)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| DbError::Dump(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| DbError::Dump(format!("{}: {}", path.display(), e)))
    }

    pub fn to_json(&self) -> Result<String, DbError> {
        serde_json::to_string_pretty(self).map_err(|e| DbError::Dump(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DbError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| DbError::Dump(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl SchemaProvider for SchemaDump {
    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor, DbError> {
        self.tables
            .get(table_name)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound {
                database: self.database_name.clone(),
                table: table_name.to_string(),
            })
    }
}

// Tables are stored as a JSON array so the file keeps the provider's order
// and each entry carries its own name.
mod tables_as_list {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::models::schema::TableDescriptor;

    pub fn serialize<S>(
        tables: &IndexMap<String, TableDescriptor>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let list: Vec<&TableDescriptor> = tables.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<IndexMap<String, TableDescriptor>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<TableDescriptor>::deserialize(deserializer)?;
        Ok(list
            .into_iter()
            .map(|table| (table.name.clone(), table))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::ColumnDescriptor;

    fn users_dump() -> SchemaDump {
        let mut users = TableDescriptor::new("users");
        users
            .columns
            .insert("id".to_string(), ColumnDescriptor::new("integer"));

        SchemaDump::new("app", Platform::Postgres)
            .with_table(users)
            .with_table(TableDescriptor::new("audit"))
    }

    #[tokio::test]
    async fn lists_tables_in_insertion_order() {
        let dump = users_dump();

        let tables = dump.list_tables().await.unwrap();
        assert_eq!(tables, vec!["users".to_string(), "audit".to_string()]);
    }

    #[tokio::test]
    async fn missing_table_is_table_not_found() {
        let dump = users_dump();

        let err = dump.describe_table("orders").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::TableNotFound { ref database, ref table } if database == "app" && table == "orders"
        ));
    }

    #[tokio::test]
    async fn capture_copies_every_table() {
        let source = users_dump();

        let captured = SchemaDump::capture(&source).await.unwrap();
        assert_eq!(captured, source);
    }

    #[test]
    fn saves_and_loads_through_a_file() {
        let dump = users_dump();
        let file = tempfile::NamedTempFile::new().unwrap();

        dump.save(file.path()).unwrap();
        let loaded = SchemaDump::load(file.path()).unwrap();

        assert_eq!(loaded, dump);
        assert_eq!(loaded.tables.keys().next().map(String::as_str), Some("users"));
    }

    #[test]
    fn load_reports_bad_json() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();

        assert!(matches!(SchemaDump::load(file.path()), Err(DbError::Dump(_))));
    }
}
