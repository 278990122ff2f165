//! Terminal operations: compile the current state, then run it.

use super::{Operation, Query};
use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::SqlResult;
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;

impl Query {
    // ==================== Reads ====================

    /// All matching rows. An empty result is not an error.
    pub async fn get_rows<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Vec<Row>> {
        let expr = self.render_select(conn.dialect())?;
        conn.fetch_all(&expr, Operation::Select).await
    }

    /// The first row. Fails with `EmptyResult` when nothing matches.
    pub async fn get_row<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Row> {
        let expr = self.render_select(conn.dialect())?;
        conn.fetch_row(&expr, Operation::Select).await
    }

    /// The first row, or `None` when nothing matches.
    pub async fn try_get_row<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Option<Row>> {
        let expr = self.render_select(conn.dialect())?;
        conn.fetch_optional(&expr, Operation::Select).await
    }

    /// First column of the first row. Fails with `EmptyResult` when nothing matches.
    pub async fn get_one<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Value> {
        let expr = self.render_select(conn.dialect())?;
        conn.fetch_scalar(&expr, Operation::Select).await
    }

    /// The scalar result as text, e.g. `"Williams"` or `"4"`.
    pub async fn to_scalar_string<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<String> {
        Ok(self.get_one(conn).await?.into_string())
    }

    /// Lazily stream matching rows. Each call runs the select again.
    pub fn stream<'a, B: Backend>(&self, conn: &'a Connection<B>) -> RowStream<'a> {
        match self.render_select(conn.dialect()) {
            Ok(expr) => conn.stream(&expr, Operation::Select),
            Err(e) => RowStream::failed(e),
        }
    }

    // ==================== Writes ====================

    /// Run the statement for `op` and return the affected row count.
    pub async fn run<B: Backend>(&self, op: Operation, conn: &Connection<B>) -> SqlResult<u64> {
        let expr = self.render_as(op, conn.dialect())?;
        conn.execute(&expr, op).await
    }

    pub async fn insert<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        self.run(Operation::Insert, conn).await
    }

    pub async fn update<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        self.run(Operation::Update, conn).await
    }

    /// Native `replace into`; rows come back in backend-defined order afterwards.
    pub async fn replace<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        self.run(Operation::Replace, conn).await
    }

    pub async fn delete<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        self.run(Operation::Delete, conn).await
    }

    pub async fn truncate<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        self.run(Operation::Truncate, conn).await
    }
}
