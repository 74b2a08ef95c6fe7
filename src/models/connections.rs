use serde::{Deserialize, Serialize};

use crate::errors::DbError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    MySql,
    Postgres,
}

impl DbType {
    /// Parse the driver names accepted at the connection prompt.
    pub fn from_driver(driver: &str) -> Result<Self, DbError> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DbType::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(DbType::Postgres),
            other => Err(DbError::Config(format!("Unsupported driver \"{}\"", other))),
        }
    }

    /// Infer the database type from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self, DbError> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .ok_or_else(|| DbError::Config(format!("Missing scheme in \"{}\"", url)))?;

        Self::from_driver(scheme)
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DbType::MySql => 3306,
            DbType::Postgres => 5432,
        }
    }

    fn scheme(&self) -> &'static str {
        match self {
            DbType::MySql => "mysql",
            DbType::Postgres => "postgres",
        }
    }
}

/// Parameters for one side of a comparison, as collected at the prompt.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub name: String,
    pub db_type: DbType,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub collation: Option<String>,
}

impl ConnectionConfig {
    /// Connection URL without the password, safe to log.
    pub fn display_url(&self) -> String {
        format!(
            "{}://{}@{}:{}/{}",
            self.db_type.scheme(),
            self.username,
            self.host,
            self.port,
            self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names_map_to_db_types() {
        assert_eq!(DbType::from_driver("mysql").unwrap(), DbType::MySql);
        assert_eq!(DbType::from_driver("PGSQL").unwrap(), DbType::Postgres);
        assert_eq!(DbType::from_driver("postgresql").unwrap(), DbType::Postgres);
        assert!(matches!(
            DbType::from_driver("oracle"),
            Err(DbError::Config(_))
        ));
    }

    #[test]
    fn url_scheme_selects_db_type() {
        assert_eq!(
            DbType::from_url("mysql://root@localhost/app").unwrap(),
            DbType::MySql
        );
        assert_eq!(
            DbType::from_url("postgres://app@db:5432/app").unwrap(),
            DbType::Postgres
        );
        assert!(DbType::from_url("localhost/app").is_err());
    }

    #[test]
    fn display_url_omits_password() {
        let config = ConnectionConfig {
            name: "primary".to_string(),
            db_type: DbType::Postgres,
            host: "127.0.0.1".to_string(),
            port: 5432,
            database: "app".to_string(),
            username: "app".to_string(),
            password: "hunter2".to_string(),
            collation: None,
        };

        let url = config.display_url();
        assert_eq!(url, "postgres://app@127.0.0.1:5432/app");
        assert!(!url.contains("hunter2"));
    }
}
