//! # sqlcraft
//!
//! SQL expression templates and an incremental query builder, rendered per
//! dialect and executed through a pluggable backend.
//!
//! ## Features
//!
//! - **Templates**: `[]` binds a value, `{}` quotes an identifier, `{{}}` quotes
//!   only bare names; nested expressions and queries compose to any depth
//! - **Dialect-aware**: quoting, placeholders, booleans, REPLACE/TRUNCATE and
//!   row limits follow the connection's dialect
//! - **Reusable builders**: every terminal call compiles a fresh statement, so a
//!   query can run again and again
//! - **Diagnostics**: execution errors carry the backend's native code and a debug
//!   query with values inlined
//! - **Backends**: tokio-postgres, deadpool-postgres and SQLite (sqlx)
//!
//! ## Expressions
//!
//! ```ignore
//! use sqlcraft::{Arg, Connection, Expression};
//!
//! let conn = Connection::new(pool);
//! let four = conn.expr("select 2+2").get_one(&conn).await?;
//!
//! let expr = Expression::new("select {} from {} where id = []")
//!     .arg(Arg::ident("name"))
//!     .arg(Arg::ident("employee"))
//!     .arg(1);
//! let name = expr.to_scalar_string(&conn).await?;
//! ```
//!
//! ## Query builder
//!
//! ```ignore
//! let rows = conn
//!     .dsql()
//!     .table("employee")
//!     .field("id, name")
//!     .where_("retired", false)
//!     .order("id")
//!     .get_rows(&conn)
//!     .await?;
//!
//! conn.dsql()
//!     .table("employee")
//!     .set("name", "Johnny")
//!     .where_("id", 1)
//!     .update(&conn)
//!     .await?;
//! ```

pub mod backend;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod prelude;
pub mod query;
pub mod row;
pub mod stream;
pub mod template;
pub mod value;

pub use backend::{Backend, BackendError, BackendStream};
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use dialect::{
    Dialect, DialectKind, MssqlDialect, MysqlDialect, OracleDialect, PostgresDialect,
    SqliteDialect,
};
pub use error::{ExecuteError, SqlError, SqlResult};
pub use expr::{Arg, Expression, Rendered};
pub use query::{Direction, Operation, Query};
pub use row::Row;
pub use stream::RowStream;
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{connect, create_pool, create_pool_with_config};

/// Build a hand-written [`Expression`] from a template.
pub fn expr(template: &str) -> Expression {
    Expression::new(template)
}

/// Start a new [`Query`].
pub fn dsql() -> Query {
    Query::new()
}
