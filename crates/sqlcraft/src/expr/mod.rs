//! Expressions: a template plus typed arguments.
//!
//! ```ignore
//! use sqlcraft::{Expression, args};
//!
//! let expr = Expression::with_args("{}=[] or {}=[]", args![
//!     sqlcraft::Arg::ident("name"), "John",
//!     sqlcraft::Arg::ident("surname"), "Doe",
//! ]);
//! let rendered = expr.render(conn.dialect())?;
//! ```
//!
//! Nested expressions and queries render inline where they are used, and their
//! bind values are spliced into the parent's parameter list in order.

mod render;


pub use render::Rendered;
pub(crate) use render::{Renderer, Strategy};

use crate::backend::Backend;
use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::query::{Operation, Query};
use crate::row::Row;
use crate::stream::RowStream;
use crate::template::Template;
use crate::value::Value;
use chrono::NaiveDateTime;

/// One argument of an [`Expression`].
///
/// The slot an argument lands in decides most of its treatment: a text value in
/// an identifier slot is quoted as a name, an [`Arg::Ident`] in a value slot is
/// quoted rather than bound, and nested expressions render inline anywhere.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A scalar, bound as a parameter.
    Value(Value),
    /// A name, quoted per dialect and never bound.
    Ident(String),
    /// A nested expression, rendered inline.
    Expr(Expression),
    /// A nested query, rendered inline as a parenthesized sub-select.
    Query(Box<Query>),
}

impl Arg {
    /// An identifier argument.
    pub fn ident(name: impl Into<String>) -> Self {
        Arg::Ident(name.into())
    }

    /// A raw SQL fragment, rendered inline.
    pub fn raw(sql: &str) -> Self {
        Arg::Expr(Expression::new(sql))
    }

    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Value(Value::Text(s)) | Arg::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Arg::Value(Value::Null))
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<Expression> for Arg {
    fn from(e: Expression) -> Self {
        Arg::Expr(e)
    }
}

impl From<Query> for Arg {
    fn from(q: Query) -> Self {
        Arg::Query(Box::new(q))
    }
}

macro_rules! impl_arg_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_arg_from_scalar!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    bool,
    f32,
    f64,
    &str,
    String,
    &String,
    Vec<u8>,
    &[u8],
    NaiveDateTime,
);

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Value(v.into())
    }
}

/// Build a `Vec<Arg>` from mixed argument expressions.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// A SQL template with its arguments.
///
/// Rendering is a pure function of the template and arguments: rendering the same
/// expression twice gives identical SQL and parameters.
#[derive(Debug, Clone)]
pub struct Expression {
    template: Template,
    args: Vec<Arg>,
    named: Vec<(String, Arg)>,
}

impl Expression {
    /// An expression with no arguments yet.
    pub fn new(template: &str) -> Self {
        Self::with_args(template, Vec::new())
    }

    pub fn with_args(template: &str, args: Vec<Arg>) -> Self {
        Self {
            template: Template::parse(template),
            args,
            named: Vec::new(),
        }
    }

    /// SQL text used as-is: brackets and braces in it are never slots.
    pub fn verbatim(sql: &str) -> Self {
        Self {
            template: Template::literal(sql),
            args: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the argument for `[name]`, `{name}` and `{{name}}` slots.
    pub fn named(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        let name = name.into();
        let arg = arg.into();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = arg,
            None => self.named.push((name, arg)),
        }
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub(crate) fn named_arg(&self, name: &str) -> Option<&Arg> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// SQL text with dialect placeholders, plus the ordered bind values.
    pub fn render(&self, dialect: &dyn Dialect) -> SqlResult<Rendered> {
        let mut r = Renderer::new(dialect, Strategy::Bind);
        r.expression(self)?;
        Ok(r.finish())
    }

    /// SQL text with values inlined as literals. For humans, never for execution.
    pub fn debug_query(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        let mut r = Renderer::new(dialect, Strategy::Inline);
        r.expression(self)?;
        Ok(r.finish().sql)
    }

    pub async fn get_rows<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Vec<Row>> {
        conn.fetch_all(self, Operation::Raw).await
    }

    /// The first row. Fails with `EmptyResult` when there is none.
    pub async fn get_row<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Row> {
        conn.fetch_row(self, Operation::Raw).await
    }

    pub async fn try_get_row<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Option<Row>> {
        conn.fetch_optional(self, Operation::Raw).await
    }

    /// First column of the first row. Fails with `EmptyResult` when there is none.
    pub async fn get_one<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<Value> {
        conn.fetch_scalar(self, Operation::Raw).await
    }

    /// Execute and return the scalar result as text.
    pub async fn to_scalar_string<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<String> {
        Ok(self.get_one(conn).await?.into_string())
    }

    /// Execute a statement that returns no rows. Returns the affected row count.
    pub async fn execute<B: Backend>(&self, conn: &Connection<B>) -> SqlResult<u64> {
        conn.execute(self, Operation::Raw).await
    }

    /// Lazily stream rows. Each call runs the statement again.
    pub fn stream<'a, B: Backend>(&self, conn: &'a Connection<B>) -> RowStream<'a> {
        conn.stream(self, Operation::Raw)
    }
}

impl From<&str> for Expression {
    fn from(template: &str) -> Self {
        Expression::new(template)
    }
}
