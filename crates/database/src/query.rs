//! Composition of the two aggregation statements.
//!
//! Statements are assembled with `sqlx::QueryBuilder` for the connected
//! database, so the SQL text can be logged before it is executed.

use crate::dialect::{Dialect, quote_ident};
use crate::schema::{heart_rates, users};
use chrono::NaiveDateTime;
use core_types::{TimeWindow, UserFilter};
use sqlx::{Database, Encode, QueryBuilder, Type};

/// How many of a user's highest hourly averages `query_for_user` keeps.
pub const TOP_HOURS: usize = 10;

const AGGREGATE_ALIAS: &str = "avg_heart_rate_subquery";
const RANKED_ALIAS: &str = "ranked_hours";

/// A read statement that can be built for any database able to bind its values.
pub trait Compose {
    fn compose<'args, DB>(&self, dialect: Dialect) -> QueryBuilder<'args, DB>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i32: Encode<'args, DB> + Type<DB>,
        f64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
        NaiveDateTime: Encode<'args, DB> + Type<DB>;
}

/// Users matching `filter` whose average heart rate inside `window` exceeds
/// the threshold.
///
/// The per-user average is a derived aggregate joined with an inner join, so
/// users without samples in the window never appear. The age bound is only
/// rendered for dialects whose cast rejects non-numeric text.
#[derive(Debug, Clone, Copy)]
pub struct UsersQuery<'a> {
    pub filter: &'a UserFilter,
    pub window: &'a TimeWindow,
}

/// The user's `limit` highest hourly averages inside `window`, oldest hour first.
///
/// Hours are ranked by descending average; equal averages at the cutoff keep
/// the earlier hour.
#[derive(Debug, Clone, Copy)]
pub struct HourlyQuery<'a> {
    pub user_id: i32,
    pub window: &'a TimeWindow,
    pub limit: usize,
}

fn column(alias: &str, name: &str) -> String {
    format!("{}.{}", alias, quote_ident(name))
}

/// Restricts `hr."timestamp"` to the inclusive window.
fn push_window<'args, DB>(builder: &mut QueryBuilder<'args, DB>, dialect: Dialect, window: &TimeWindow)
where
    DB: Database,
    NaiveDateTime: Encode<'args, DB> + Type<DB>,
{
    let (open, close) = dialect.timestamp_operand();
    let timestamp = format!("{open}{}{close}", column("hr", heart_rates::TIMESTAMP));
    builder
        .push(format!("{timestamp} >= {open}"))
        .push_bind(window.from)
        .push(format!("{close} AND {timestamp} <= {open}"))
        .push_bind(window.to)
        .push(close);
}

impl Compose for UsersQuery<'_> {
    fn compose<'args, DB>(&self, dialect: Dialect) -> QueryBuilder<'args, DB>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i32: Encode<'args, DB> + Type<DB>,
        f64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
        NaiveDateTime: Encode<'args, DB> + Type<DB>,
    {
        let user_id = column("hr", heart_rates::USER_ID);
        let mut builder = QueryBuilder::new(format!(
            "SELECT {}, {}, {}, {} FROM {} AS u JOIN (SELECT {user_id} AS user_id, AVG({}) AS avg_heart_rate FROM {} AS hr WHERE ",
            column("u", users::ID),
            column("u", users::NAME),
            column("u", users::GENDER),
            column("u", users::AGE),
            quote_ident(users::TABLE),
            column("hr", heart_rates::HEART_RATE),
            quote_ident(heart_rates::TABLE),
        ));
        push_window(&mut builder, dialect, self.window);
        builder.push(format!(
            " GROUP BY {user_id}) AS {AGGREGATE_ALIAS} ON {} = {AGGREGATE_ALIAS}.user_id WHERE ",
            column("u", users::ID),
        ));
        if dialect.casts_text_strictly() {
            builder
                .push(format!("CAST({} AS INTEGER) > ", column("u", users::AGE)))
                .push_bind(self.filter.min_age)
                .push(" AND ");
        }
        builder
            .push(format!("{} = ", column("u", users::GENDER)))
            .push_bind(self.filter.gender.clone())
            .push(format!(" AND {AGGREGATE_ALIAS}.avg_heart_rate > "))
            .push_bind(self.filter.min_avg_heart_rate);

        builder
    }
}

impl Compose for HourlyQuery<'_> {
    fn compose<'args, DB>(&self, dialect: Dialect) -> QueryBuilder<'args, DB>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i32: Encode<'args, DB> + Type<DB>,
        f64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
        NaiveDateTime: Encode<'args, DB> + Type<DB>,
    {
        let bucket = dialect.hour_bucket(&column("hr", heart_rates::TIMESTAMP));
        let mut builder = QueryBuilder::new(format!(
            "SELECT {RANKED_ALIAS}.avg_heart_rate FROM (SELECT AVG({}) AS avg_heart_rate, {bucket} AS hour_bucket FROM {} AS hr WHERE {} = ",
            column("hr", heart_rates::HEART_RATE),
            quote_ident(heart_rates::TABLE),
            column("hr", heart_rates::USER_ID),
        ));
        builder.push_bind(self.user_id).push(" AND ");
        push_window(&mut builder, dialect, self.window);
        builder.push(format!(
            " GROUP BY {bucket} ORDER BY avg_heart_rate DESC, hour_bucket ASC LIMIT {}) AS {RANKED_ALIAS} ORDER BY {RANKED_ALIAS}.hour_bucket ASC",
            self.limit
        ));

        builder
    }
}
