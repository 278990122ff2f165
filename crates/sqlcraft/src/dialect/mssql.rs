//! Microsoft SQL Server dialect.

use super::{Dialect, DialectKind};

/// SQL Server: `[ident]`, `@Pn` placeholders, `bit` booleans.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlDialect;

impl Dialect for MssqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Mssql
    }

    fn identifier_quote(&self) -> (char, char) {
        ('[', ']')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{index}")
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex::encode_upper(bytes))
    }

    // OFFSET/FETCH is only valid after ORDER BY.
    fn limit_clause(&self, limit: Option<u64>, skip: Option<u64>) -> String {
        offset_fetch(limit, skip)
    }
}

/// ANSI `OFFSET ... ROWS FETCH NEXT ... ROWS ONLY`, shared with Oracle.
pub(super) fn offset_fetch(limit: Option<u64>, skip: Option<u64>) -> String {
    if limit.is_none() && skip.is_none() {
        return String::new();
    }
    let mut out = format!(" offset {} rows", skip.unwrap_or(0));
    if let Some(n) = limit {
        out.push_str(&format!(" fetch next {n} rows only"));
    }
    out
}
