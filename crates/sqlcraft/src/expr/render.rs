use super::{Arg, Expression};
use crate::dialect::{Dialect, is_bare_identifier};
use crate::error::{SqlError, SqlResult};
use crate::template::{Segment, SlotKey, SlotKind};
use crate::value::Value;

/// Rendered SQL text and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Rendered {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// What happens to values in value slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Emit a dialect placeholder and collect the value.
    Bind,
    /// Emit the value as a SQL literal.
    Inline,
}

/// Single-pass writer shared by the execution and diagnostic renderings.
pub(crate) struct Renderer<'d> {
    dialect: &'d dyn Dialect,
    strategy: Strategy,
    sql: String,
    params: Vec<Value>,
}

impl<'d> Renderer<'d> {
    pub(crate) fn new(dialect: &'d dyn Dialect, strategy: Strategy) -> Self {
        Self {
            dialect,
            strategy,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    pub(crate) fn finish(self) -> Rendered {
        Rendered {
            sql: self.sql,
            params: self.params,
        }
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn push_value(&mut self, value: &Value) {
        match self.strategy {
            Strategy::Bind => {
                let bound = match value {
                    Value::Bool(b) => self.dialect.bind_bool(*b),
                    other => other.clone(),
                };
                self.params.push(bound);
                let placeholder = self.dialect.placeholder(self.params.len());
                self.sql.push_str(&placeholder);
            }
            Strategy::Inline => {
                let literal = self.dialect.inline_value(value);
                self.sql.push_str(&literal);
            }
        }
    }

    fn push_identifier(&mut self, name: &str) {
        self.dialect.write_identifier(name, &mut self.sql);
    }

    /// Walk `expr`'s template, filling each slot from its arguments.
    pub(crate) fn expression(&mut self, expr: &Expression) -> SqlResult<()> {
        let expected = expr.template.positional_count();
        if expected != expr.args.len() {
            return Err(SqlError::TemplateMismatch {
                expected,
                got: expr.args.len(),
            });
        }

        for segment in expr.template.segments() {
            match segment {
                Segment::Literal(text) => self.push_str(text),
                Segment::Slot { kind, key } => {
                    let arg = match key {
                        SlotKey::Positional(i) => &expr.args[*i],
                        SlotKey::Named(name) => expr
                            .named_arg(name)
                            .ok_or_else(|| SqlError::MissingArgument(name.clone()))?,
                    };
                    self.slot(*kind, arg)?;
                }
            }
        }
        Ok(())
    }

    fn slot(&mut self, kind: SlotKind, arg: &Arg) -> SqlResult<()> {
        match (kind, arg) {
            (_, Arg::Expr(nested)) => self.expression(nested)?,
            (_, Arg::Query(query)) => {
                self.push_str("(");
                query.write_select(self)?;
                self.push_str(")");
            }
            (SlotKind::Value, Arg::Value(value)) => self.push_value(value),
            (_, Arg::Ident(name)) => self.push_identifier(name),
            (SlotKind::Identifier, Arg::Value(Value::Text(name))) => self.push_identifier(name),
            (SlotKind::SoftIdentifier, Arg::Value(Value::Text(name))) => {
                if is_bare_identifier(name) {
                    self.push_identifier(name);
                } else {
                    self.push_str(name);
                }
            }
            (_, Arg::Value(other)) => {
                return Err(SqlError::InvalidArgument(format!(
                    "{} value cannot fill an identifier placeholder",
                    other.kind()
                )));
            }
        }
        Ok(())
    }
}
