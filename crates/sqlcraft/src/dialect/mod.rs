//! SQL dialect profiles.
//!
//! A [`Dialect`] describes how one backend spells the parts of a statement that
//! differ between databases: identifier quoting, parameter placeholders, boolean
//! values, and a handful of statement variants (REPLACE, TRUNCATE, row limits).
//! The rest of the engine is dialect-agnostic and only talks to this trait.

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;


pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::value::Value;
use std::fmt;

/// The backend family a dialect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
    Oracle,
}

impl DialectKind {
    /// Platform name, as used in error-code tables.
    pub fn name(self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgresql",
            DialectKind::Mysql => "mysql",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Mssql => "mssql",
            DialectKind::Oracle => "oracle",
        }
    }

    /// Guess the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" | "pgsql" => Some(DialectKind::Postgres),
            "mysql" | "mariadb" => Some(DialectKind::Mysql),
            "sqlite" => Some(DialectKind::Sqlite),
            "mssql" | "sqlserver" => Some(DialectKind::Mssql),
            "oracle" | "oci" => Some(DialectKind::Oracle),
            _ => None,
        }
    }

    /// Build the profile for this backend family.
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            DialectKind::Postgres => Box::new(PostgresDialect),
            DialectKind::Mysql => Box::new(MysqlDialect),
            DialectKind::Sqlite => Box::new(SqliteDialect),
            DialectKind::Mssql => Box::new(MssqlDialect),
            DialectKind::Oracle => Box::new(OracleDialect),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend-specific rendering rules.
///
/// Profiles are immutable and shared read-only by every statement rendered for a
/// connection.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Opening and closing identifier quote characters.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Placeholder for the `index`-th (1-based) bind parameter.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Value actually bound for a boolean argument.
    fn bind_bool(&self, value: bool) -> Value {
        Value::Int(i64::from(value))
    }

    /// Literal spelling of a boolean in SQL text.
    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    /// Quote and escape a string literal.
    fn string_literal(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for ch in s.chars() {
            if ch == '\'' {
                out.push('\'');
            }
            out.push(ch);
        }
        out.push('\'');
        out
    }

    /// Hex literal for binary data.
    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex::encode_upper(bytes))
    }

    /// Whether `REPLACE INTO` is available natively.
    fn supports_replace(&self) -> bool {
        false
    }

    /// Template that empties a table; `{}` receives the table name.
    fn truncate_template(&self) -> &'static str {
        "truncate table {}"
    }

    /// Row limiting clause, including its leading space. Empty when neither bound is set.
    fn limit_clause(&self, limit: Option<u64>, skip: Option<u64>) -> String {
        match (limit, skip) {
            (None, None) => String::new(),
            (Some(n), None) => format!(" limit {n}"),
            (Some(n), Some(m)) => format!(" limit {n} offset {m}"),
            (None, Some(m)) => format!(" limit -1 offset {m}"),
        }
    }

    /// Suffix for a SELECT that has no table.
    fn tableless_from(&self) -> &'static str {
        ""
    }

    /// Write `name` quoted into `out`.
    ///
    /// Dotted names are quoted part by part and a bare `*` part is left alone, so
    /// `e2.*` renders as `"e2".*`.
    fn write_identifier(&self, name: &str, out: &mut String) {
        let (open, close) = self.identifier_quote();
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            if part == "*" {
                out.push('*');
                continue;
            }
            out.push(open);
            for ch in part.chars() {
                if ch == close {
                    out.push(close);
                }
                out.push(ch);
            }
            out.push(close);
        }
    }

    fn quote_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_identifier(name, &mut out);
        out
    }

    /// Inverse of [`Dialect::quote_identifier`].
    ///
    /// Unquoted parts pass through unchanged.
    fn unquote_identifier(&self, quoted: &str) -> String {
        let (open, close) = self.identifier_quote();
        let mut out = String::with_capacity(quoted.len());
        let mut chars = quoted.chars().peekable();
        let mut in_quotes = false;
        while let Some(ch) = chars.next() {
            if in_quotes {
                if ch == close {
                    if chars.peek() == Some(&close) {
                        chars.next();
                        out.push(close);
                    } else {
                        in_quotes = false;
                    }
                } else {
                    out.push(ch);
                }
            } else if ch == open {
                in_quotes = true;
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Literal rendering of a value, used only for diagnostic output.
    fn inline_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b).to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) if x.is_finite() => x.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::Text(s) => self.string_literal(s),
            Value::Bytes(b) => self.bytes_literal(b),
            Value::Timestamp(t) => self.string_literal(&t.to_string()),
        }
    }
}

/// Whether `s` is a plain (optionally dotted) identifier that is safe to quote.
///
/// Parts match `[A-Za-z_][A-Za-z0-9_$]*`; a part may also be `*`.
pub fn is_bare_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|part| {
            if part == "*" {
                return true;
            }
            let mut chars = part.chars();
            match chars.next() {
                Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
                _ => return false,
            }
            chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
        })
}
