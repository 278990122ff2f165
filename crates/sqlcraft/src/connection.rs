//! A backend paired with its dialect.
//!
//! [`Connection`] is where rendered statements meet the driver. It renders with
//! bind placeholders, logs the statement, runs it, and turns driver failures into
//! [`SqlError`]s that carry the statement's debug query.

use crate::backend::{Backend, BackendError};
use crate::config::ConnectionConfig;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, Rendered};
use crate::query::{Operation, Query};
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;
use futures_util::{StreamExt, stream};
use std::time::{Duration, Instant};
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// A database backend with the dialect used to render statements for it.
///
/// Expressions and queries hold no connection; pass one to their terminal
/// methods. A connection may be shared by any number of them.
pub struct Connection<B> {
    backend: B,
    dialect: Box<dyn Dialect>,
    config: ConnectionConfig,
}

impl<B: Backend> Connection<B> {
    /// Wrap `backend`, picking the dialect from its backend family.
    pub fn new(backend: B) -> Self {
        let dialect = backend.dialect_kind().dialect();
        Self {
            backend,
            dialect,
            config: ConnectionConfig::default(),
        }
    }

    /// Render with a different dialect than the backend's default.
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Box::new(dialect);
        self
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Start a new query builder.
    pub fn dsql(&self) -> Query {
        Query::new()
    }

    /// Start a new expression.
    pub fn expr(&self, template: &str) -> Expression {
        Expression::new(template)
    }

    fn prepare(&self, expr: &Expression, op: Operation) -> SqlResult<Rendered> {
        let rendered = expr.render(self.dialect())?;
        self.log_statement(op, &rendered);
        Ok(rendered)
    }

    pub(crate) async fn fetch_all(&self, expr: &Expression, op: Operation) -> SqlResult<Vec<Row>> {
        let rendered = self.prepare(expr, op)?;
        let start = Instant::now();
        let result = self
            .backend
            .fetch_all(&rendered.sql, &rendered.params)
            .await
            .map_err(|e| self.translate(e, expr, &rendered));
        self.log_outcome(op, &rendered.sql, start.elapsed(), result.as_ref().err());
        result
    }

    pub(crate) async fn fetch_optional(
        &self,
        expr: &Expression,
        op: Operation,
    ) -> SqlResult<Option<Row>> {
        Ok(self.fetch_all(expr, op).await?.into_iter().next())
    }

    pub(crate) async fn fetch_row(&self, expr: &Expression, op: Operation) -> SqlResult<Row> {
        self.fetch_optional(expr, op)
            .await?
            .ok_or_else(|| SqlError::empty_result("expected one row, got none"))
    }

    pub(crate) async fn fetch_scalar(&self, expr: &Expression, op: Operation) -> SqlResult<Value> {
        self.fetch_row(expr, op)
            .await?
            .into_first()
            .ok_or_else(|| SqlError::empty_result("expected one column, got none"))
    }

    pub(crate) async fn execute(&self, expr: &Expression, op: Operation) -> SqlResult<u64> {
        let rendered = self.prepare(expr, op)?;
        let start = Instant::now();
        let result = self
            .backend
            .execute(&rendered.sql, &rendered.params)
            .await
            .map_err(|e| self.translate(e, expr, &rendered));
        self.log_outcome(op, &rendered.sql, start.elapsed(), result.as_ref().err());
        result
    }

    /// Stream rows. The outcome is logged on the first item and on any error;
    /// timing starts when the stream is first polled.
    pub(crate) fn stream(&self, expr: &Expression, op: Operation) -> RowStream<'_> {
        let rendered = match self.prepare(expr, op) {
            Ok(rendered) => rendered,
            Err(e) => return RowStream::failed(e),
        };
        let debug_query = self.debug_query(expr, &rendered);
        let sql = rendered.sql.clone();
        let Rendered { sql: exec_sql, params } = rendered;

        let mut first = true;
        let rows = stream::once(async move {
            (Instant::now(), self.backend.fetch_stream(exec_sql, params))
        })
        .flat_map(|(start, rows)| rows.map(move |row| (start, row)))
        .map(move |(start, row)| {
            let row = row.map_err(|e| translate(e, &debug_query));
            if first || row.is_err() {
                first = false;
                self.log_outcome(op, &sql, start.elapsed(), row.as_ref().err());
            }
            row
        });
        RowStream::new(rows)
    }

    fn debug_query(&self, expr: &Expression, rendered: &Rendered) -> String {
        expr.debug_query(self.dialect())
            .unwrap_or_else(|_| rendered.sql.clone())
    }

    fn translate(&self, err: BackendError, expr: &Expression, rendered: &Rendered) -> SqlError {
        translate(err, &self.debug_query(expr, rendered))
    }

    fn log_statement(&self, op: Operation, rendered: &Rendered) {
        if !self.config.logging_enabled {
            return;
        }
        let sql = self.config.truncate_sql(&rendered.sql);
        emit_at_level!(
            self.config.log_level,
            target: "sqlcraft.sql",
            dialect = self.dialect.name(),
            operation = op.as_str(),
            param_count = rendered.params.len(),
            sql = %sql,
        );
    }

    fn log_outcome(
        &self,
        op: Operation,
        sql: &str,
        elapsed: Duration,
        error: Option<&SqlError>,
    ) {
        if !self.config.logging_enabled {
            return;
        }
        let elapsed_ms = elapsed.as_millis() as u64;
        if let Some(err) = error {
            tracing::warn!(
                target: "sqlcraft.sql",
                operation = op.as_str(),
                code = err.code().unwrap_or("-"),
                elapsed_ms,
                error = %err,
                "statement failed"
            );
        } else if self.config.is_slow(elapsed) {
            tracing::warn!(
                target: "sqlcraft.sql",
                operation = op.as_str(),
                elapsed_ms,
                sql = %self.config.truncate_sql(sql),
                "slow statement"
            );
        }
    }
}

fn translate(err: BackendError, debug_query: &str) -> SqlError {
    match err {
        BackendError::Statement { code, message } => SqlError::execute(code, message, debug_query),
        BackendError::Connection(message) => SqlError::Connection(message),
        BackendError::Decode { column, message } => SqlError::Decode { column, message },
    }
}

impl<B> std::fmt::Debug for Connection<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
