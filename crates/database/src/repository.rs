use crate::connection::DbPool;
use crate::error::{QueryError, guarded, operation_failed};
use crate::query::{HourlyQuery, TOP_HOURS, UsersQuery};
use core_types::{TimeWindow, User, UserFilter};

/// The `QueryEngine` answers the two heart-rate questions against the pool.
///
/// It holds no state besides the pool; every call acquires one connection,
/// runs one read-only statement and releases the connection before returning.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    pool: DbPool,
}

impl QueryEngine {
    /// Creates a new `QueryEngine` with a shared database connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Fetches every user matching `filter` whose average heart rate inside
    /// `window` is above `filter.min_avg_heart_rate`.
    ///
    /// A stored `age` that is not an integer fails the whole query. Row order
    /// is whatever the database produces.
    #[tracing::instrument(name = "query_users", skip(self))]
    pub async fn query_users(
        &self,
        filter: &UserFilter,
        window: &TimeWindow,
    ) -> Result<Vec<User>, QueryError> {
        let statement = UsersQuery { filter, window };
        let users = guarded("query_users", self.pool.fetch_all::<User, _>(&statement)).await?;

        if self.pool.dialect().casts_text_strictly() {
            return Ok(users);
        }
        older_than(users, filter.min_age)
    }

    /// Fetches the user's ten highest hourly average heart rates inside
    /// `window`, ordered by hour ascending. Only the averages are returned.
    ///
    /// An unknown user, or one without samples in the window, yields an
    /// empty vector.
    #[tracing::instrument(name = "query_for_user", skip(self))]
    pub async fn query_for_user(
        &self,
        user_id: i32,
        window: &TimeWindow,
    ) -> Result<Vec<f64>, QueryError> {
        let statement = HourlyQuery { user_id, window, limit: TOP_HOURS };
        let rows = guarded("query_for_user", self.pool.fetch_all::<(f64,), _>(&statement)).await?;
        Ok(rows.into_iter().map(|(avg_heart_rate,)| avg_heart_rate).collect())
    }
}

/// Applies the exclusive age bound to fetched rows, parsing each `age` strictly.
fn older_than(users: Vec<User>, min_age: i32) -> Result<Vec<User>, QueryError> {
    let mut kept = Vec::with_capacity(users.len());
    for user in users {
        let age = user
            .age_years()
            .map_err(|e| operation_failed("query_users", &e))?;
        if age > min_age {
            kept.push(user);
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, age: &str) -> User {
        User {
            id,
            name: None,
            gender: "F".to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn age_bound_is_exclusive() {
        let kept = older_than(vec![user(1, "25"), user(2, "26"), user(3, " 40 ")], 25).unwrap();
        assert_eq!(kept.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn non_numeric_age_fails_the_query() {
        let err = older_than(vec![user(1, "30"), user(2, "40abc")], 0).unwrap_err();
        assert_eq!(err.operation(), "query_users");
        assert!(err.message().contains("40abc"), "{}", err.message());
    }
}
