//! tokio-postgres adapter.

use super::{Backend, BackendError, BackendStream};
use crate::dialect::DialectKind;
use crate::row::Row;
use crate::value::{Value, parse_bool};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use futures_util::{StreamExt, TryFutureExt};
use std::error::Error;
use std::future::Future;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Value::Int(i64::from(*b)).to_sql(ty, out),
            },
            Value::Int(n) => int_to_sql(*n, ty, out),
            Value::Float(x) => match *ty {
                Type::FLOAT8 => x.to_sql(ty, out),
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => rust_decimal::Decimal::try_from(*x)?.to_sql(ty, out),
                _ if is_text(ty) => x.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Text(s) => text_to_sql(s, ty, out),
            Value::Bytes(b) => match *ty {
                Type::BYTEA => b.as_slice().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Timestamp(t) => match *ty {
                Type::TIMESTAMP => t.to_sql(ty, out),
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(t).to_sql(ty, out),
                Type::DATE => t.date().to_sql(ty, out),
                _ if is_text(ty) => t.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn int_to_sql(n: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT8 => n.to_sql(ty, out),
        Type::INT4 => i32::try_from(n)?.to_sql(ty, out),
        Type::INT2 => i16::try_from(n)?.to_sql(ty, out),
        Type::FLOAT8 => (n as f64).to_sql(ty, out),
        Type::FLOAT4 => (n as f32).to_sql(ty, out),
        Type::BOOL => (n != 0).to_sql(ty, out),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => rust_decimal::Decimal::from(n).to_sql(ty, out),
        _ if is_text(ty) => n.to_string().to_sql(ty, out),
        _ => Err(mismatch(&Value::Int(n), ty)),
    }
}

/// Text binds are parsed into whatever type the server inferred for the slot.
fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        _ if is_text(ty) => s.to_sql(ty, out),
        Type::BOOL => parse_bool(s)
            .ok_or_else(|| format!("invalid boolean literal '{s}'"))?
            .to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(s.trim().parse()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => s.trim().parse::<rust_decimal::Decimal>()?.to_sql(ty, out),
        Type::TIMESTAMP => s.parse::<NaiveDateTime>()?.to_sql(ty, out),
        Type::DATE => s.parse::<NaiveDate>()?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
        Type::BYTEA => s.as_bytes().to_sql(ty, out),
        _ => Err(format!("cannot bind text as {ty}").into()),
    }
}

fn is_text(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot bind {} as {ty}", value.kind()).into()
}

fn convert_row(row: &tokio_postgres::Row) -> Result<Row, BackendError> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = cell(row, idx, column.type_())
            .map_err(|e| BackendError::decode(column.name(), e.to_string()))?;
        out.push(column.name(), value);
    }
    Ok(out)
}

fn cell(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> Result<Value, tokio_postgres::Error> {
    let value: Value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.into(),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.into(),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => row
            .try_get::<_, Option<rust_decimal::Decimal>>(idx)?
            .map(|d| d.to_string())
            .into(),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.into(),
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx)?.into(),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|t| t.naive_utc())
            .into(),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|d| d.to_string())
            .into(),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(|j| j.to_string())
            .into(),
        _ => row.try_get::<_, Option<String>>(idx)?.into(),
    };
    Ok(value)
}

fn map_error(err: tokio_postgres::Error) -> BackendError {
    if let Some(db) = err.as_db_error() {
        return BackendError::statement(Some(db.code().code().to_string()), db.message());
    }
    if err.is_closed() {
        return BackendError::Connection(err.to_string());
    }
    BackendError::statement(err.code().map(|c| c.code().to_string()), err.to_string())
}

fn bind_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Rows of a `query_raw` call, converted as they arrive.
fn row_stream<'a, F>(query: F) -> BackendStream<'a>
where
    F: Future<Output = Result<tokio_postgres::RowStream, tokio_postgres::Error>> + Send + 'a,
{
    let rows = query.map_err(map_error).map_ok(|stream| {
        stream.map(|row| row.map_err(map_error).and_then(|row| convert_row(&row)))
    });
    Box::pin(rows.try_flatten_stream())
}

impl Backend for tokio_postgres::Client {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        let rows = tokio_postgres::Client::query(self, sql, &bind_refs(params))
            .await
            .map_err(map_error)?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        tokio_postgres::Client::execute(self, sql, &bind_refs(params))
            .await
            .map_err(map_error)
    }

    fn fetch_stream(&self, sql: String, params: Vec<Value>) -> BackendStream<'_> {
        row_stream(async move { self.query_raw(sql.as_str(), params.iter()).await })
    }
}

impl Backend for tokio_postgres::Transaction<'_> {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        let rows = tokio_postgres::Transaction::query(self, sql, &bind_refs(params))
            .await
            .map_err(map_error)?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        tokio_postgres::Transaction::execute(self, sql, &bind_refs(params))
            .await
            .map_err(map_error)
    }

    fn fetch_stream(&self, sql: String, params: Vec<Value>) -> BackendStream<'_> {
        row_stream(async move { self.query_raw(sql.as_str(), params.iter()).await })
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Backend for deadpool_postgres::Client {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        // Delegate to the deref target (tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        Backend::fetch_all(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        let client: &tokio_postgres::Client = self;
        Backend::execute(client, sql, params).await
    }

    fn fetch_stream(&self, sql: String, params: Vec<Value>) -> BackendStream<'_> {
        let client: &tokio_postgres::Client = self;
        Backend::fetch_stream(client, sql, params)
    }
}

/// Checks a client out of the pool for every statement.
#[cfg(feature = "pool")]
impl Backend for deadpool_postgres::Pool {
    fn dialect_kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        let client = self.get().await.map_err(pool_error)?;
        Backend::fetch_all(&client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        let client = self.get().await.map_err(pool_error)?;
        Backend::execute(&client, sql, params).await
    }
}

#[cfg(feature = "pool")]
fn pool_error(err: deadpool_postgres::PoolError) -> BackendError {
    BackendError::Connection(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(value: Value, ty: &Type) -> Result<Vec<u8>, BoxError> {
        let mut out = BytesMut::new();
        value.to_sql_checked(ty, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn ints_narrow_to_the_inferred_type() {
        assert_eq!(bind(Value::Int(4), &Type::INT4).unwrap(), 4i32.to_be_bytes());
        assert_eq!(bind(Value::Int(4), &Type::INT2).unwrap(), 4i16.to_be_bytes());
        assert!(bind(Value::Int(i64::MAX), &Type::INT4).is_err());
    }

    #[test]
    fn text_parses_into_typed_slots() {
        assert_eq!(bind(Value::from("7"), &Type::INT8).unwrap(), 7i64.to_be_bytes());
        assert_eq!(bind(Value::from("t"), &Type::BOOL).unwrap(), vec![1]);
        assert_eq!(bind(Value::from("abc"), &Type::TEXT).unwrap(), b"abc".to_vec());
        assert!(bind(Value::from("abc"), &Type::INT4).is_err());
    }

    #[test]
    fn bools_follow_the_slot() {
        assert_eq!(bind(Value::Bool(true), &Type::BOOL).unwrap(), vec![1]);
        assert_eq!(bind(Value::Bool(true), &Type::INT4).unwrap(), 1i32.to_be_bytes());
    }

    #[test]
    fn null_binds_as_null() {
        let mut out = BytesMut::new();
        let is_null = Value::Null.to_sql_checked(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
    }

    #[test]
    fn bytes_only_bind_to_bytea() {
        assert_eq!(bind(Value::Bytes(vec![1, 2]), &Type::BYTEA).unwrap(), vec![1, 2]);
        assert!(bind(Value::Bytes(vec![1]), &Type::INT4).is_err());
    }
}
