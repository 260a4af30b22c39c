use crate::error::CoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table.
///
/// `age` is stored as text by the upstream writer and is only interpreted as
/// an integer at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub gender: String,
    pub age: String,
}

impl User {
    /// Parses the text-encoded `age` column.
    pub fn age_years(&self) -> Result<i32, CoreError> {
        self.age
            .trim()
            .parse::<i32>()
            .map_err(|e| CoreError::InvalidInput("age".to_string(), format!("{:?}: {}", self.age, e)))
    }
}

/// A single heart-rate measurement, one row of the `heart_rates` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HeartRateSample {
    pub id: i32,
    pub user_id: i32,
    pub timestamp: NaiveDateTime,
    pub heart_rate: f64,
}

/// An inclusive `[from, to]` aggregation window.
///
/// An inverted window (`from > to`) is not rejected; it simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self { from, to }
    }
}

/// Demographic and heart-rate thresholds for the user search.
///
/// Both numeric bounds are exclusive: a user qualifies only with an age
/// strictly above `min_age` and a window average strictly above
/// `min_avg_heart_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    pub min_age: i32,
    pub gender: String,
    pub min_avg_heart_rate: f64,
}

impl UserFilter {
    pub fn new(min_age: i32, gender: impl Into<String>, min_avg_heart_rate: f64) -> Self {
        Self {
            min_age,
            gender: gender.into(),
            min_avg_heart_rate,
        }
    }
}
