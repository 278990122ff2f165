//! SQLite adapter over an sqlx pool.

use super::{Backend, BackendError};
use crate::dialect::DialectKind;
use crate::row::Row;
use crate::value::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<i64>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(n) => query.bind(*n),
        Value::Float(x) => query.bind(*x),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Bytes(b) => query.bind(b.as_slice()),
        Value::Timestamp(t) => query.bind(*t),
    }
}

fn build<'q>(sql: &'q str, params: &'q [Value]) -> SqliteQuery<'q> {
    params.iter().fold(sqlx::query(sql), bind_value)
}

/// Convert by storage class. Integer cells in columns declared `BOOLEAN`
/// come back as booleans.
fn convert_row(row: &SqliteRow) -> Result<Row, BackendError> {
    let mut out = Row::with_capacity(row.len());
    for column in row.columns() {
        let idx = column.ordinal();
        let name = column.name();
        let decode = |e: sqlx::Error| BackendError::decode(name, e.to_string());

        let raw = row.try_get_raw(idx).map_err(decode)?;
        if raw.is_null() {
            out.push(name, Value::Null);
            continue;
        }
        let storage = raw.type_info().name().to_string();
        let declared = column.type_info().name().to_ascii_uppercase();

        let value = match storage.as_str() {
            "INTEGER" | "BOOLEAN" => {
                let n: i64 = row.try_get(idx).map_err(decode)?;
                if declared.contains("BOOL") {
                    Value::Bool(n != 0)
                } else {
                    Value::Int(n)
                }
            }
            "REAL" => Value::Float(row.try_get(idx).map_err(decode)?),
            "BLOB" => Value::Bytes(row.try_get(idx).map_err(decode)?),
            _ => Value::Text(row.try_get(idx).map_err(decode)?),
        };
        out.push(name, value);
    }
    Ok(out)
}

fn map_error(err: sqlx::Error) -> BackendError {
    match err {
        sqlx::Error::Database(db) => {
            BackendError::statement(db.code().map(|c| c.into_owned()), db.message())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => BackendError::Connection(err.to_string()),
        sqlx::Error::ColumnDecode { index, source } => {
            BackendError::decode(index, source.to_string())
        }
        other => BackendError::statement(None, other.to_string()),
    }
}

impl Backend for SqlitePool {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        let rows = build(sql, params).fetch_all(self).await.map_err(map_error)?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        let done = build(sql, params).execute(self).await.map_err(map_error)?;
        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn cells_follow_storage_class() {
        let pool = memory_pool().await;
        Backend::execute(
            &pool,
            "create table t (id integer, name varchar(20), retired boolean, score real, raw blob)",
            &[],
        )
        .await
        .unwrap();
        Backend::execute(
            &pool,
            "insert into t values (?, ?, ?, ?, ?)",
            &[
                Value::Int(1),
                Value::from("John"),
                Value::Int(0),
                Value::Float(1.5),
                Value::Bytes(vec![1, 2]),
            ],
        )
        .await
        .unwrap();

        let rows = Backend::fetch_all(&pool, "select * from t", &[]).await.unwrap();
        let row = &rows[0];
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("name"), Some(&Value::from("John")));
        assert_eq!(row.get("retired"), Some(&Value::Bool(false)));
        assert_eq!(row.get("score"), Some(&Value::Float(1.5)));
        assert_eq!(row.get("raw"), Some(&Value::Bytes(vec![1, 2])));
    }

    #[tokio::test]
    async fn database_errors_keep_native_code() {
        let pool = memory_pool().await;
        let err = Backend::fetch_all(&pool, "select x from missing", &[])
            .await
            .unwrap_err();
        match err {
            BackendError::Statement { code, message } => {
                assert_eq!(code.as_deref(), Some("1"));
                assert!(message.contains("no such table"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
