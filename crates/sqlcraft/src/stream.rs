use crate::error::{SqlError, SqlResult};
use crate::row::Row;
use futures_core::Stream;
use futures_util::{StreamExt, stream};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A lazy stream of result rows.
///
/// Nothing is sent to the backend until the stream is first polled. Every call
/// that produces a stream runs the statement again; rows are never replayed.
#[must_use]
pub struct RowStream<'a> {
    inner: Pin<Box<dyn Stream<Item = SqlResult<Row>> + Send + 'a>>,
}

impl<'a> RowStream<'a> {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = SqlResult<Row>> + Send + 'a,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream that yields `err` once, for statements that failed to render.
    pub(crate) fn failed(err: SqlError) -> Self {
        Self::new(stream::once(async move { Err(err) }))
    }

    /// Drain the stream, stopping at the first error.
    pub async fn try_collect(mut self) -> SqlResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }
}

impl Stream for RowStream<'_> {
    type Item = SqlResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
