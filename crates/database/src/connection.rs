use crate::dialect::Dialect;
use crate::error::DbError;
use crate::query::Compose;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, QueryBuilder};
use std::str::FromStr;
use std::time::Duration;

/// A connection pool for one of the supported databases.
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl From<PgPool> for DbPool {
    fn from(pool: PgPool) -> Self {
        DbPool::Postgres(pool)
    }
}

impl From<SqlitePool> for DbPool {
    fn from(pool: SqlitePool) -> Self {
        DbPool::Sqlite(pool)
    }
}

impl DbPool {
    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::Postgres(_) => Dialect::Postgres,
            DbPool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Closes every pooled connection. Later queries fail with a pool-closed error.
    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }

    /// Executes a parameterless statement such as DDL.
    pub(crate) async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        match self {
            DbPool::Postgres(pool) => sqlx::query(sql).execute(pool).await.map(|_| ()),
            DbPool::Sqlite(pool) => sqlx::query(sql).execute(pool).await.map(|_| ()),
        }
    }

    /// Builds `statement` for this pool's database, runs it on one pooled
    /// connection and collects every row.
    ///
    /// The connection is checked out for the duration of the call and goes
    /// back to the pool when it is dropped, on success and on error alike.
    pub(crate) async fn fetch_all<O, S>(&self, statement: &S) -> Result<Vec<O>, sqlx::Error>
    where
        O: for<'r> FromRow<'r, PgRow> + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        S: Compose,
    {
        match self {
            DbPool::Postgres(pool) => {
                let mut builder: QueryBuilder<'_, Postgres> = statement.compose(Dialect::Postgres);
                tracing::debug!(sql = builder.sql(), "Composed statement.");
                let mut conn = pool.acquire().await?;
                builder.build_query_as::<O>().fetch_all(&mut *conn).await
            }
            DbPool::Sqlite(pool) => {
                let mut builder: QueryBuilder<'_, Sqlite> = statement.compose(Dialect::Sqlite);
                tracing::debug!(sql = builder.sql(), "Composed statement.");
                let mut conn = pool.acquire().await?;
                builder.build_query_as::<O>().fetch_all(&mut *conn).await
            }
        }
    }
}

/// Establishes a connection pool to the database named by `settings.url`.
///
/// At least one connection is opened eagerly, so an unreachable database is
/// reported here rather than on the first query.
pub async fn connect(settings: &DatabaseSettings) -> Result<DbPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()));
    }

    let dialect: Dialect = settings
        .backend()
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
        .into();
    let acquire_timeout = Duration::from_secs(settings.acquire_timeout_secs);

    let pool: DbPool = match dialect {
        Dialect::Postgres => PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(&settings.url)
            .await?
            .into(),
        Dialect::Sqlite => {
            let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(acquire_timeout)
                .connect_with(options)
                .await?
                .into()
        }
    };

    tracing::info!(?dialect, max_connections = settings.max_connections, "Connected to the database.");
    Ok(pool)
}
