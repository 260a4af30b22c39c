//! Table declarations for the two entities and the idempotent step that
//! creates them.
//!
//! The layout here is the on-disk contract shared with the external writer
//! that populates the tables. Materialization is additive only: tables and
//! indexes are created when absent and never dropped or altered.

use crate::connection::DbPool;
use crate::dialect::{Dialect, quote_ident};
use crate::error::DbError;
use core_types::{HeartRateSample, User};

/// Column names of the `users` table.
pub mod users {
    pub const TABLE: &str = "users";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const GENDER: &str = "gender";
    pub const AGE: &str = "age";
}

/// Column names of the `heart_rates` table.
pub mod heart_rates {
    pub const TABLE: &str = "heart_rates";
    pub const ID: &str = "id";
    pub const USER_ID: &str = "user_id";
    pub const TIMESTAMP: &str = "timestamp";
    pub const HEART_RATE: &str = "heart_rate";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer primary key.
    Serial,
    Integer,
    Text,
    Timestamp,
    Float,
}

impl ColumnType {
    pub fn sql_type(&self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (ColumnType::Serial, Dialect::Postgres) => "SERIAL",
            (ColumnType::Serial, Dialect::Sqlite) => "INTEGER",
            (ColumnType::Integer, _) => "INTEGER",
            (ColumnType::Text, Dialect::Postgres) => "VARCHAR",
            (ColumnType::Text, Dialect::Sqlite) => "TEXT",
            (ColumnType::Timestamp, _) => "TIMESTAMP",
            (ColumnType::Float, Dialect::Postgres) => "DOUBLE PRECISION",
            (ColumnType::Float, Dialect::Sqlite) => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            primary_key: false,
            references: None,
        }
    }

    const fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Serial,
            primary_key: true,
            references: None,
        }
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    fn to_sql(self, dialect: Dialect) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name), self.ty.sql_type(dialect));
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some(fk) = self.references {
            sql.push_str(&format!(
                " REFERENCES {} ({})",
                quote_ident(fk.table),
                quote_ident(fk.column)
            ));
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub column: &'static str,
}

/// A table declaration: its columns and secondary indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| c.to_sql(dialect)).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.name),
            columns.join(", ")
        )
    }

    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                    quote_ident(index.name),
                    quote_ident(self.name),
                    quote_ident(index.column)
                )
            })
            .collect()
    }
}

pub const USERS_TABLE: TableDef = TableDef {
    name: users::TABLE,
    columns: &[
        ColumnDef::primary_key(users::ID),
        ColumnDef::new(users::NAME, ColumnType::Text),
        ColumnDef::new(users::GENDER, ColumnType::Text),
        ColumnDef::new(users::AGE, ColumnType::Text),
    ],
    indexes: &[],
};

pub const HEART_RATES_TABLE: TableDef = TableDef {
    name: heart_rates::TABLE,
    columns: &[
        ColumnDef::primary_key(heart_rates::ID),
        ColumnDef::new(heart_rates::USER_ID, ColumnType::Integer).references(users::TABLE, users::ID),
        ColumnDef::new(heart_rates::TIMESTAMP, ColumnType::Timestamp),
        ColumnDef::new(heart_rates::HEART_RATE, ColumnType::Float),
    ],
    indexes: &[
        IndexDef {
            name: "ix_heart_rates_user_id",
            column: heart_rates::USER_ID,
        },
        IndexDef {
            name: "ix_heart_rates_timestamp",
            column: heart_rates::TIMESTAMP,
        },
    ],
};

/// Binds a row struct to the table it is read from.
pub trait Entity {
    const TABLE: &'static TableDef;
}

impl Entity for User {
    const TABLE: &'static TableDef = &USERS_TABLE;
}

impl Entity for HeartRateSample {
    const TABLE: &'static TableDef = &HEART_RATES_TABLE;
}

/// Every table, in creation order (referenced tables first).
pub const SCHEMA: [&TableDef; 2] = [User::TABLE, HeartRateSample::TABLE];

/// Creates any missing table or index. Safe to run on every start.
pub async fn materialize_schema(pool: &DbPool) -> Result<(), DbError> {
    let dialect = pool.dialect();
    for table in SCHEMA {
        pool.execute(&table.create_table_sql(dialect))
            .await
            .map_err(|source| DbError::SchemaError {
                object: table.name,
                source,
            })?;

        for (index, sql) in table.indexes.iter().zip(table.create_index_sql()) {
            pool.execute(&sql)
                .await
                .map_err(|source| DbError::SchemaError {
                    object: index.name,
                    source,
                })?;
        }
    }

    tracing::info!(tables = SCHEMA.len(), "Database schema is in place.");
    Ok(())
}
