#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use configuration::DatabaseSettings;
use core_types::User;
use database::{DbPool, QueryEngine};
use sqlx::SqlitePool;
use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// A throwaway SQLite database with the schema in place.
pub struct TestDb {
    pub dir: TempDir,
    pub url: String,
    pub pool: DbPool,
    pub sqlite: SqlitePool,
}

impl TestDb {
    pub fn engine(&self) -> QueryEngine {
        QueryEngine::new(self.pool.clone())
    }
}

pub async fn setup() -> TestDb {
    let db = setup_without_schema().await;
    database::materialize_schema(&db.pool).await.unwrap();
    db
}

pub async fn setup_without_schema() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("health.db").display());
    let pool = database::connect(&DatabaseSettings::new(url.clone())).await.unwrap();
    let DbPool::Sqlite(sqlite) = pool.clone() else {
        panic!("expected a SQLite pool for {url}");
    };
    TestDb { dir, url, pool, sqlite }
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn user(id: i32, gender: &str, age: &str) -> User {
    User {
        id,
        name: Some(format!("user-{id}")),
        gender: gender.to_string(),
        age: age.to_string(),
    }
}

pub async fn insert_user(pool: &SqlitePool, user: &User) {
    sqlx::query("INSERT INTO users (id, name, gender, age) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.gender)
        .bind(&user.age)
        .execute(pool)
        .await
        .unwrap();
}

/// Inserts `(timestamp, heart_rate)` readings for `user_id`, letting the database assign ids.
pub async fn insert_readings(pool: &SqlitePool, user_id: i32, readings: &[(NaiveDateTime, f64)]) {
    for (timestamp, heart_rate) in readings {
        sqlx::query("INSERT INTO heart_rates (user_id, timestamp, heart_rate) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(*timestamp)
            .bind(*heart_rate)
            .execute(pool)
            .await
            .unwrap();
    }
}

/// Inserts a reading whose timestamp is stored exactly as the given text.
pub async fn insert_reading_text(pool: &SqlitePool, user_id: i32, timestamp: &str, heart_rate: f64) {
    sqlx::query("INSERT INTO heart_rates (user_id, timestamp, heart_rate) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(timestamp)
        .bind(heart_rate)
        .execute(pool)
        .await
        .unwrap();
}

/// Collects formatted log output written through a `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
