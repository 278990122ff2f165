//! Incremental query builder.
//!
//! A [`Query`] accumulates clause state through consuming mutators. Nothing is
//! rendered until a terminal method runs, and each terminal call compiles a
//! fresh [`Expression`](crate::Expression) from the current state, so the same
//! query can be rendered and executed any number of times.
//!
//! ```ignore
//! use sqlcraft::Query;
//!
//! let surname = Query::new()
//!     .table("employee")
//!     .field("surname")
//!     .where_("name", "Jack")
//!     .to_scalar_string(&conn)
//!     .await?;
//!
//! Query::new()
//!     .table("employee")
//!     .set("id", 1)
//!     .set("name", "John")
//!     .insert(&conn)
//!     .await?;
//! ```

mod compile;
mod exec;

#[cfg(test)]
mod tests;

use crate::expr::{Arg, Expression};
use crate::value::Value;

/// The statement form a query compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Replace,
    Delete,
    Truncate,
    /// A hand-written expression, not compiled from builder state.
    Raw,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
            Operation::Truncate => "truncate",
            Operation::Raw => "raw",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Comparison operators accepted by [`Query::where_op`] and [`Query::having_op`].
pub const OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "like", "not like", "in", "not in", "is", "is not",
];

#[derive(Debug, Clone)]
enum Condition {
    Compare { field: Arg, op: String, value: Arg },
    In { field: Arg, values: Vec<Value>, negated: bool },
    Null { field: Arg, negated: bool },
    Expr(Expression),
}

/// Clause state for one logical statement.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// FROM sources with optional aliases
    tables: Vec<(Arg, Option<String>)>,
    /// SELECT list (default `*`)
    fields: Vec<(Arg, Option<String>)>,
    /// WHERE predicates, AND-ed
    conditions: Vec<Condition>,
    /// HAVING predicates, AND-ed
    having: Vec<Condition>,
    group: Vec<Arg>,
    order: Vec<(Arg, Option<Direction>)>,
    limit: Option<u64>,
    skip: Option<u64>,
    /// Assignments for insert / update / replace, in staging order
    assignments: Vec<(String, Arg)>,
    /// Keywords after SELECT, e.g. `distinct`
    options: Vec<String>,
    /// First misuse seen by a mutator, reported when the query is compiled
    build_error: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, message: String) {
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    // ==================== Sources ====================

    /// Add a FROM source: a table name, an expression, or a query.
    ///
    /// Queries used as derived tables need an alias; see [`Query::table_as`].
    pub fn table(mut self, source: impl Into<Arg>) -> Self {
        self.tables.push((source.into(), None));
        self
    }

    /// Add a FROM source under an alias.
    pub fn table_as(mut self, source: impl Into<Arg>, alias: impl Into<String>) -> Self {
        self.tables.push((source.into(), Some(alias.into())));
        self
    }

    // ==================== SELECT list ====================

    /// Append to the SELECT list.
    ///
    /// A plain comma-separated list such as `"name, surname"` adds one field per
    /// name. Text containing parentheses is kept whole.
    pub fn field(mut self, spec: impl Into<Arg>) -> Self {
        let spec = spec.into();
        match spec.as_text() {
            Some(text) if text.contains(',') && !text.contains('(') => {
                let names: Vec<Arg> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Arg::from)
                    .collect();
                self.fields.extend(names.into_iter().map(|n| (n, None)));
            }
            _ => self.fields.push((spec, None)),
        }
        self
    }

    /// Append one field under an alias.
    pub fn field_as(mut self, spec: impl Into<Arg>, alias: impl Into<String>) -> Self {
        self.fields.push((spec.into(), Some(alias.into())));
        self
    }

    /// Add a SELECT modifier such as `distinct`.
    pub fn option(mut self, keyword: impl Into<String>) -> Self {
        self.options.push(keyword.into());
        self
    }

    // ==================== WHERE ====================

    /// `field = value`. A null value becomes `field is null`.
    pub fn where_(self, field: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.where_op(field, "=", value)
    }

    /// `field <op> value`, with `op` one of [`OPERATORS`].
    pub fn where_op(mut self, field: impl Into<Arg>, op: &str, value: impl Into<Arg>) -> Self {
        let cond = self.compare(field.into(), op, value.into());
        self.conditions.extend(cond);
        self
    }

    /// A free-form predicate, e.g. one containing `or`.
    pub fn where_expr(mut self, expr: impl Into<Expression>) -> Self {
        self.conditions.push(Condition::Expr(expr.into()));
        self
    }

    /// `field in (...)`. An empty list matches nothing.
    pub fn where_in<V: Into<Value>>(
        mut self,
        field: impl Into<Arg>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        });
        self
    }

    /// `field not in (...)`. An empty list matches everything.
    pub fn where_not_in<V: Into<Value>>(
        mut self,
        field: impl Into<Arg>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        });
        self
    }

    pub fn where_null(mut self, field: impl Into<Arg>) -> Self {
        self.conditions.push(Condition::Null {
            field: field.into(),
            negated: false,
        });
        self
    }

    pub fn where_not_null(mut self, field: impl Into<Arg>) -> Self {
        self.conditions.push(Condition::Null {
            field: field.into(),
            negated: true,
        });
        self
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group(mut self, field: impl Into<Arg>) -> Self {
        self.group.push(field.into());
        self
    }

    pub fn having_(self, field: impl Into<Arg>, value: impl Into<Arg>) -> Self {
        self.having_op(field, "=", value)
    }

    pub fn having_op(mut self, field: impl Into<Arg>, op: &str, value: impl Into<Arg>) -> Self {
        let cond = self.compare(field.into(), op, value.into());
        self.having.extend(cond);
        self
    }

    pub fn having_expr(mut self, expr: impl Into<Expression>) -> Self {
        self.having.push(Condition::Expr(expr.into()));
        self
    }

    // ==================== ORDER BY / LIMIT ====================

    /// Append an ordering. A trailing ` asc` / ` desc` in text is read as the direction.
    pub fn order(mut self, spec: impl Into<Arg>) -> Self {
        let spec = spec.into();
        let split = spec.as_text().and_then(split_direction);
        match split {
            Some((field, dir)) => self.order.push((Arg::from(field), Some(dir))),
            None => self.order.push((spec, None)),
        }
        self
    }

    pub fn order_by(mut self, field: impl Into<Arg>, direction: Direction) -> Self {
        self.order.push((field.into(), Some(direction)));
        self
    }

    pub fn order_expr(mut self, expr: impl Into<Expression>) -> Self {
        self.order.push((Arg::Expr(expr.into()), None));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn limit_offset(mut self, limit: u64, skip: u64) -> Self {
        self.limit = Some(limit);
        self.skip = Some(skip);
        self
    }

    // ==================== Assignments ====================

    /// Stage `field = value` for insert, update, or replace.
    ///
    /// Setting the same field twice keeps its position and the latest value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((field, value)),
        }
        self
    }

    pub fn set_many<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
    {
        pairs.into_iter().fold(self, |q, (k, v)| q.set(k, v))
    }

    fn compare(&mut self, field: Arg, op: &str, value: Arg) -> Option<Condition> {
        let op = normalize_op(op);
        if !OPERATORS.contains(&op.as_str()) {
            self.fail(format!("unsupported operator '{op}'"));
            return None;
        }
        if value.is_null() {
            let negated = match op.as_str() {
                "=" | "is" => false,
                "!=" | "<>" | "is not" => true,
                _ => {
                    self.fail(format!("operator '{op}' cannot compare with null"));
                    return None;
                }
            };
            return Some(Condition::Null { field, negated });
        }
        Some(Condition::Compare { field, op, value })
    }
}

fn normalize_op(op: &str) -> String {
    op.split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_direction(spec: &str) -> Option<(&str, Direction)> {
    let (field, dir) = spec.trim().rsplit_once(' ')?;
    let dir = match dir.to_ascii_lowercase().as_str() {
        "asc" => Direction::Asc,
        "desc" => Direction::Desc,
        _ => return None,
    };
    Some((field.trim_end(), dir))
}
