//! Runs both operations against a live PostgreSQL server.
//!
//! Ignored by default. Run with
//! `DATABASE_URL=postgres://... cargo test -p database --test postgres -- --ignored`.
//! Rows use ids from 910001 upwards and are removed before and after the test.

use chrono::{NaiveDate, NaiveDateTime};
use configuration::DatabaseSettings;
use core_types::{TimeWindow, UserFilter};
use database::{DbPool, QueryEngine, QueryError};
use sqlx::PgPool;

const IDS: [i32; 3] = [910001, 910002, 910003];

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn clear(pool: &PgPool) {
    sqlx::query("DELETE FROM heart_rates WHERE user_id = ANY($1)")
        .bind(&IDS[..])
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(&IDS[..])
        .execute(pool)
        .await
        .unwrap();
}

async fn seed(pool: &PgPool) {
    for (id, gender, age) in [(IDS[0], "F", "34"), (IDS[1], "F", "20"), (IDS[2], "M", "41")] {
        sqlx::query("INSERT INTO users (id, name, gender, age) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(format!("pg-{id}"))
            .bind(gender)
            .bind(age)
            .execute(pool)
            .await
            .unwrap();
    }
    let readings = [
        (IDS[0], at(9, 0), 90.0),
        (IDS[0], at(10, 0), 100.0),
        (IDS[1], at(9, 0), 65.0),
        (IDS[1], at(10, 0), 75.0),
        (IDS[2], at(8, 10), 55.0),
        (IDS[2], at(8, 40), 65.0),
        (IDS[2], at(9, 10), 90.0),
        (IDS[2], at(10, 10), 75.0),
        (IDS[2], at(11, 10), 90.0),
    ];
    for (user_id, timestamp, heart_rate) in readings {
        sqlx::query("INSERT INTO heart_rates (user_id, timestamp, heart_rate) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(timestamp)
            .bind(heart_rate)
            .execute(pool)
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn both_operations_run_on_postgres() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping");
        return;
    };
    let pool = database::connect(&DatabaseSettings::new(url)).await.unwrap();
    let DbPool::Postgres(pg) = pool.clone() else {
        panic!("DATABASE_URL must point at PostgreSQL");
    };
    database::materialize_schema(&pool).await.unwrap();
    clear(&pg).await;
    seed(&pg).await;

    let engine = QueryEngine::new(pool.clone());
    let day = TimeWindow::new(at(0, 0), at(23, 59));

    let users = engine
        .query_users(&UserFilter::new(25, "F", 80.0), &day)
        .await
        .unwrap();
    let ours: Vec<i32> = users.iter().map(|u| u.id).filter(|id| IDS.contains(id)).collect();
    assert_eq!(ours, vec![IDS[0]]);

    assert_eq!(
        engine.query_for_user(IDS[2], &day).await,
        Ok(vec![60.0, 90.0, 75.0, 90.0])
    );
    assert_eq!(
        engine
            .query_for_user(IDS[2], &TimeWindow::new(at(12, 0), at(23, 59)))
            .await,
        Ok(vec![])
    );

    sqlx::query("UPDATE users SET age = 'thirty' WHERE id = $1")
        .bind(IDS[1])
        .execute(&pg)
        .await
        .unwrap();
    let err = engine
        .query_users(&UserFilter::new(25, "F", 0.0), &day)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::DatabaseOperation { operation: "query_users", .. }));

    clear(&pg).await;
    pool.close().await;
}
