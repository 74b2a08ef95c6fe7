use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{db::SchemaProvider, errors::DbError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MySql,
    Postgres,
}

impl Platform {
    /// Length a column of the given logical type has when none is declared.
    pub fn default_length(&self, logical_type: &str) -> Option<u32> {
        match (self, logical_type) {
            (Platform::MySql | Platform::Postgres, "string") => Some(255),
            (Platform::MySql | Platform::Postgres, "binary") => Some(255),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MySql => write!(f, "mysql"),
            Platform::Postgres => write!(f, "postgres"),
        }
    }
}

/// Table list of one database, captured once per comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub database_name: String,
    pub platform: Platform,
    pub tables: Vec<String>,
}

impl SchemaSnapshot {
    pub async fn capture(provider: &dyn SchemaProvider) -> Result<Self, DbError> {
        let tables = provider.list_tables().await?;

        Ok(Self {
            database_name: provider.database_name(),
            platform: provider.platform(),
            tables,
        })
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|name| name == table)
    }

    /// Tables of `self` that `other` also lists, in `self`'s order.
    pub fn common_tables(&self, other: &SchemaSnapshot) -> Vec<String> {
        self.tables
            .iter()
            .filter(|name| other.contains(name))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: IndexMap<String, ColumnDescriptor>,
    #[serde(default)]
    pub indexes: IndexMap<String, IndexDescriptor>,
    #[serde(default)]
    pub foreign_keys: IndexMap<String, ForeignKeyDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            indexes: IndexMap::new(),
            foreign_keys: IndexMap::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Logical, platform independent type name (`string`, `integer`, ...).
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub auto_increment: bool,
}

fn nullable_by_default() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            column_type: column_type.into(),
            length: None,
            nullable: true,
            default: None,
            unsigned: false,
            auto_increment: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct IndexDescriptor {
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_unique: bool,
    pub columns: Vec<String>,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ForeignKeyDescriptor {
    pub local_table_name: String,
    pub foreign_table_name: String,
    pub local_columns: Vec<String>,
    pub foreign_columns: Vec<String>,
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    /// Parse an `information_schema` rule such as `SET NULL`.
    pub fn from_rule(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET NULL" => Some(ReferentialAction::SetNull),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "NO ACTION" => Some(ReferentialAction::NoAction),
            "SET DEFAULT" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
