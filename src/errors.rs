use thiserror::Error;

/// Errors raised while reading a schema from a database or a dump.
///
/// Any of these is fatal to the comparison run that hit it.
#[derive(Error, Debug)]
pub enum DbError {
    /// Error that occurs during database interactions (e.g., SQL query failure).
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    /// Connection error (e.g., issues with network or database connection).
    #[error("Connection error: {0}")]
    Connection(String),
    /// Configuration error (e.g., invalid database URL or missing parameters).
    #[error("Configuration error: {0}")]
    Config(String),
    /// The table was listed but could not be described (dropped mid-run).
    #[error("Table \"{table}\" was not found in \"{database}\"")]
    TableNotFound { database: String, table: String },
    /// Listing the tables failed.
    #[error("Failed to list tables of \"{database}\": {message}")]
    TableList { database: String, message: String },
    #[error("Failed to introspect \"{database}.{table}\": {message}")]
    Introspection {
        database: String,
        table: String,
        message: String,
    },
    /// Schema dump could not be read or written.
    #[error("Schema dump error: {0}")]
    Dump(String),
}

impl DbError {
    pub fn table_list(database: impl Into<String>, message: impl ToString) -> Self {
        Self::TableList {
            database: database.into(),
            message: message.to_string(),
        }
    }

    pub fn introspection(
        database: impl Into<String>,
        table: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Introspection {
            database: database.into(),
            table: table.into(),
            message: message.to_string(),
        }
    }
}

/// Errors raised by a diff sink while writing a record.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The single error type returned by a comparison run.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error(transparent)]
    SchemaAccess(#[from] DbError),
    #[error("Failed to write diff output: {0}")]
    Output(#[from] OutputError),
}
