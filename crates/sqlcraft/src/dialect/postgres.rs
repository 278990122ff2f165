//! PostgreSQL dialect.

use super::{Dialect, DialectKind};
use crate::value::Value;

/// PostgreSQL: `"ident"`, `$n` placeholders, native booleans.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn bind_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex::encode_upper(bytes))
    }

    fn limit_clause(&self, limit: Option<u64>, skip: Option<u64>) -> String {
        match (limit, skip) {
            (None, None) => String::new(),
            (Some(n), None) => format!(" limit {n}"),
            (Some(n), Some(m)) => format!(" limit {n} offset {m}"),
            (None, Some(m)) => format!(" offset {m}"),
        }
    }
}
