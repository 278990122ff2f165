//! SQLite dialect.

use super::{Dialect, DialectKind};

/// SQLite: `"ident"`, `?` placeholders, booleans as `0`/`1`, native `REPLACE`.
///
/// SQLite has no `TRUNCATE`; emptying a table is an unrestricted `DELETE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn supports_replace(&self) -> bool {
        true
    }

    fn truncate_template(&self) -> &'static str {
        "delete from {}"
    }
}
