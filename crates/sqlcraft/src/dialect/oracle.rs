//! Oracle dialect.

use super::mssql::offset_fetch;
use super::{Dialect, DialectKind};

/// Oracle: `"ident"`, `:n` placeholders, `number(1)` booleans, `from dual`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDialect;

impl Dialect for OracleDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{index}")
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("hextoraw('{}')", hex::encode_upper(bytes))
    }

    fn limit_clause(&self, limit: Option<u64>, skip: Option<u64>) -> String {
        offset_fetch(limit, skip)
    }

    fn tableless_from(&self) -> &'static str {
        " from dual"
    }
}
