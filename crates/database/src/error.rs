use thiserror::Error;

/// Errors raised while establishing the pool or materializing the schema.
/// These happen at startup and are fatal to the caller.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection configuration: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Failed to create table or index '{object}': {source}")]
    SchemaError {
        object: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// The structured error returned by every query operation.
///
/// A query either yields rows (possibly none) or this value; an empty result
/// is never reported as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("An error occurred while executing the request: {message}")]
    DatabaseOperation {
        operation: &'static str,
        message: String,
    },
}

impl QueryError {
    /// The name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            QueryError::DatabaseOperation { operation, .. } => operation,
        }
    }

    /// The underlying database message.
    pub fn message(&self) -> &str {
        match self {
            QueryError::DatabaseOperation { message, .. } => message,
        }
    }
}

/// Logs a failed operation and wraps the failure as a `QueryError`.
///
/// Every query failure goes through here, so each fault is reported exactly once.
pub(crate) fn operation_failed(operation: &'static str, error: &dyn std::fmt::Display) -> QueryError {
    tracing::error!(operation, error = %error, "Database operation failed.");
    QueryError::DatabaseOperation {
        operation,
        message: error.to_string(),
    }
}

/// Runs a database future and converts its failure into a `QueryError`.
pub(crate) async fn guarded<T, F>(operation: &'static str, query: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    query.await.map_err(|e| operation_failed(operation, &e))
}
