//! The execution boundary.
//!
//! A [`Backend`] accepts rendered SQL plus ordered bind values and returns rows or
//! a driver error. It knows nothing about templates or builders; [`Connection`]
//! does the rendering, logging, and error translation around it.
//!
//! [`Connection`]: crate::Connection

mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(test)]
pub(crate) mod mock;

use crate::dialect::DialectKind;
use crate::row::Row;
use crate::value::Value;
use futures_core::Stream;
use futures_util::{StreamExt, future, stream};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A failure reported by a backend driver, before it is tied to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend rejected the statement.
    #[error("{message}")]
    Statement {
        code: Option<String>,
        message: String,
    },

    /// The connection itself is unusable.
    #[error("{0}")]
    Connection(String),

    /// A result cell could not be represented as a [`Value`].
    #[error("column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl BackendError {
    pub fn statement(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Statement {
            code,
            message: message.into(),
        }
    }

    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }
}

/// Rows pulled one at a time from a backend.
pub type BackendStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, BackendError>> + Send + 'a>>;

/// A database driver that can run rendered statements.
pub trait Backend: Send + Sync {
    /// Backend family, used to pick the default dialect.
    fn dialect_kind(&self) -> DialectKind;

    /// Run a statement and collect every row.
    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>, BackendError>> + Send;

    /// Run a statement and return the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send;

    /// Run a statement and stream its rows.
    ///
    /// Nothing is sent until the stream is first polled. The default buffers the
    /// whole result through [`Backend::fetch_all`]; drivers with a native cursor
    /// override it.
    fn fetch_stream(&self, sql: String, params: Vec<Value>) -> BackendStream<'_> {
        let rows = async move { self.fetch_all(&sql, &params).await };
        Box::pin(stream::once(rows).flat_map(|result| match result {
            Ok(rows) => stream::iter(rows.into_iter().map(Ok)).left_stream(),
            Err(e) => stream::once(future::ready(Err(e))).right_stream(),
        }))
    }
}

impl<B: Backend> Backend for &B {
    fn dialect_kind(&self) -> DialectKind {
        (**self).dialect_kind()
    }

    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>, BackendError>> + Send {
        (**self).fetch_all(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send {
        (**self).execute(sql, params)
    }

    fn fetch_stream(&self, sql: String, params: Vec<Value>) -> BackendStream<'_> {
        (**self).fetch_stream(sql, params)
    }
}
