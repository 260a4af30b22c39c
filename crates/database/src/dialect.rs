use configuration::Backend;

/// The SQL flavour spoken by the connected database.
///
/// Statements are composed once per dialect. They differ in hour truncation,
/// timestamp comparison, the age cast and a handful of DDL type names.
/// Placeholders are rendered by `sqlx::QueryBuilder` (`$n` on PostgreSQL,
/// `?` on SQLite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl From<Backend> for Dialect {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Postgres => Dialect::Postgres,
            Backend::Sqlite => Dialect::Sqlite,
        }
    }
}

impl Dialect {
    /// Renders an expression truncating `column` to the start of its hour.
    pub fn hour_bucket(&self, column: &str) -> String {
        match self {
            Dialect::Postgres => format!("date_trunc('hour', {column})"),
            Dialect::Sqlite => format!("strftime('%Y-%m-%d %H:00:00', {column})"),
        }
    }

    /// Text placed around both sides of a timestamp comparison.
    ///
    /// SQLite keeps timestamps as text, and a writer may use either a space or
    /// a `T` between date and time. `julianday` compares the instants instead
    /// of the strings.
    pub fn timestamp_operand(&self) -> (&'static str, &'static str) {
        match self {
            Dialect::Postgres => ("", ""),
            Dialect::Sqlite => ("julianday(", ")"),
        }
    }

    /// Whether `CAST(text AS INTEGER)` fails on non-numeric text.
    ///
    /// SQLite casts such text to its numeric prefix (or 0) without error, so the
    /// age bound is applied to the fetched rows instead, with a strict parse.
    pub fn casts_text_strictly(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

/// Double-quotes an identifier so keywords like `timestamp` are safe as column names.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
