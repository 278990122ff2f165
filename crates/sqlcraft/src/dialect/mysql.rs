//! MySQL / MariaDB dialect.

use super::{Dialect, DialectKind};

/// MySQL: `` `ident` ``, `?` placeholders, booleans as `0`/`1`, native `REPLACE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    // Backslash is an escape character inside MySQL string literals.
    fn string_literal(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for ch in s.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
        out.push('\'');
        out
    }

    fn supports_replace(&self) -> bool {
        true
    }

    fn limit_clause(&self, limit: Option<u64>, skip: Option<u64>) -> String {
        match (limit, skip) {
            (None, None) => String::new(),
            (Some(n), None) => format!(" limit {n}"),
            (Some(n), Some(m)) => format!(" limit {n} offset {m}"),
            (None, Some(m)) => format!(" limit {} offset {m}", u64::MAX),
        }
    }
}
