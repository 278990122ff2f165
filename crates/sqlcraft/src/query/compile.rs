//! Builder state -> one [`Expression`] per operation.

use super::{Condition, Operation, Query};
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Arg, Expression, Rendered, Renderer};
use crate::template::SlotKind;

/// Accumulates template text and the arguments for its slots.
#[derive(Default)]
struct Compiler {
    template: String,
    args: Vec<Arg>,
}

impl Compiler {
    fn text(&mut self, s: &str) -> &mut Self {
        self.template.push_str(s);
        self
    }

    fn slot(&mut self, kind: SlotKind, arg: Arg) -> &mut Self {
        self.template.push_str(match kind {
            SlotKind::Value => "[]",
            SlotKind::Identifier => "{}",
            SlotKind::SoftIdentifier => "{{}}",
        });
        self.args.push(arg);
        self
    }

    /// Caller-supplied SQL, kept out of the template so it is never re-scanned.
    fn verbatim(&mut self, sql: &str) -> &mut Self {
        self.slot(SlotKind::Value, Arg::Expr(Expression::verbatim(sql)))
    }

    fn ident(&mut self, name: &str) -> &mut Self {
        self.slot(SlotKind::Identifier, Arg::ident(name))
    }

    /// Comma-join `items`, writing each through `f`.
    fn list<T>(&mut self, items: &[T], mut f: impl FnMut(&mut Self, &T)) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            f(self, item);
        }
        self
    }

    fn finish(self) -> Expression {
        Expression::with_args(&self.template, self.args)
    }
}

impl Query {
    /// Compile the statement for `op`.
    ///
    /// `Operation::Raw` is not a builder operation and is rejected.
    pub fn render_as(&self, op: Operation, dialect: &dyn Dialect) -> SqlResult<Expression> {
        match op {
            Operation::Select => self.render_select(dialect),
            Operation::Insert => self.render_insert(dialect),
            Operation::Update => self.render_update(dialect),
            Operation::Replace => self.render_replace(dialect),
            Operation::Delete => self.render_delete(dialect),
            Operation::Truncate => self.render_truncate(dialect),
            Operation::Raw => Err(SqlError::invalid_query(
                "a query builder cannot render a raw statement",
            )),
        }
    }

    pub fn render_select(&self, dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.validate()?;
        let mut c = Compiler::default();
        c.text("select");
        for option in &self.options {
            c.text(" ").verbatim(option);
        }

        c.text(" ");
        if self.fields.is_empty() {
            c.text("*");
        } else {
            c.list(&self.fields, |c, (spec, alias)| {
                c.slot(SlotKind::SoftIdentifier, spec.clone());
                if let Some(alias) = alias {
                    c.text(" as ").ident(alias);
                }
            });
        }

        if self.tables.is_empty() {
            c.text(dialect.tableless_from());
        } else {
            for (source, alias) in &self.tables {
                if matches!(source, Arg::Query(_)) && alias.is_none() {
                    return Err(SqlError::invalid_query("a derived table needs an alias"));
                }
            }
            c.text(" from ");
            c.list(&self.tables, |c, (source, alias)| {
                c.slot(SlotKind::Identifier, source.clone());
                if let Some(alias) = alias {
                    c.text(" ").ident(alias);
                }
            });
        }

        write_conditions(&mut c, " where ", &self.conditions);

        if !self.group.is_empty() {
            c.text(" group by ");
            c.list(&self.group, |c, field| {
                c.slot(SlotKind::SoftIdentifier, field.clone());
            });
        }

        write_conditions(&mut c, " having ", &self.having);

        if !self.order.is_empty() {
            c.text(" order by ");
            c.list(&self.order, |c, (field, dir)| {
                c.slot(SlotKind::SoftIdentifier, field.clone());
                if let Some(dir) = dir {
                    c.text(" ").text(dir.as_str());
                }
            });
        }

        c.text(&dialect.limit_clause(self.limit, self.skip));
        Ok(c.finish())
    }

    pub fn render_insert(&self, dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.write_insert("insert", dialect)
    }

    /// Compile a native `replace into`. Fails for dialects without one.
    pub fn render_replace(&self, dialect: &dyn Dialect) -> SqlResult<Expression> {
        if !dialect.supports_replace() {
            return Err(SqlError::Unsupported {
                dialect: dialect.name(),
                feature: "replace",
            });
        }
        self.write_insert("replace", dialect)
    }

    pub fn render_update(&self, _dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.validate()?;
        let table = self.target("update")?;
        if self.assignments.is_empty() {
            return Err(SqlError::invalid_query("update needs at least one assignment"));
        }

        let mut c = Compiler::default();
        c.text("update ").slot(SlotKind::Identifier, table).text(" set ");
        c.list(&self.assignments, |c, (field, value)| {
            c.ident(field).text("=").slot(SlotKind::Value, value.clone());
        });
        write_conditions(&mut c, " where ", &self.conditions);
        Ok(c.finish())
    }

    pub fn render_delete(&self, _dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.validate()?;
        let table = self.target("delete")?;
        if !self.assignments.is_empty() {
            return Err(SqlError::invalid_query("delete cannot use staged assignments"));
        }

        let mut c = Compiler::default();
        c.text("delete from ").slot(SlotKind::Identifier, table);
        write_conditions(&mut c, " where ", &self.conditions);
        Ok(c.finish())
    }

    pub fn render_truncate(&self, dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.validate()?;
        let table = self.target("truncate")?;
        if !self.assignments.is_empty() {
            return Err(SqlError::invalid_query("truncate cannot use staged assignments"));
        }
        if !self.conditions.is_empty() {
            return Err(SqlError::invalid_query("truncate cannot use conditions"));
        }
        Ok(Expression::with_args(dialect.truncate_template(), vec![table]))
    }

    /// Bind-form rendering of the select statement.
    pub fn render(&self, dialect: &dyn Dialect) -> SqlResult<Rendered> {
        self.render_select(dialect)?.render(dialect)
    }

    /// Select statement with values inlined, for inspection.
    pub fn debug_query(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        self.render_select(dialect)?.debug_query(dialect)
    }

    /// Write this query's select form into an enclosing rendering.
    pub(crate) fn write_select(&self, r: &mut Renderer<'_>) -> SqlResult<()> {
        let expr = self.render_select(r.dialect())?;
        r.expression(&expr)
    }

    fn validate(&self) -> SqlResult<()> {
        match &self.build_error {
            Some(err) => Err(SqlError::invalid_query(err.clone())),
            None => Ok(()),
        }
    }

    /// The single table a write statement targets.
    fn target(&self, op: &str) -> SqlResult<Arg> {
        match self.tables.as_slice() {
            [(Arg::Query(_), _)] => Err(SqlError::invalid_query(format!(
                "{op} cannot target a derived table"
            ))),
            [(table, _)] => Ok(table.clone()),
            [] => Err(SqlError::invalid_query(format!("{op} needs a table"))),
            _ => Err(SqlError::invalid_query(format!(
                "{op} needs exactly one table"
            ))),
        }
    }

    fn write_insert(&self, verb: &str, _dialect: &dyn Dialect) -> SqlResult<Expression> {
        self.validate()?;
        let table = self.target(verb)?;
        if self.assignments.is_empty() {
            return Err(SqlError::invalid_query(format!(
                "{verb} needs at least one assignment"
            )));
        }
        if !self.conditions.is_empty() {
            return Err(SqlError::invalid_query(format!("{verb} cannot use conditions")));
        }

        let mut c = Compiler::default();
        c.text(verb).text(" into ").slot(SlotKind::Identifier, table).text(" (");
        c.list(&self.assignments, |c, (field, _)| {
            c.ident(field);
        });
        c.text(") values (");
        c.list(&self.assignments, |c, (_, value)| {
            c.slot(SlotKind::Value, value.clone());
        });
        c.text(")");
        Ok(c.finish())
    }
}

fn write_conditions(c: &mut Compiler, keyword: &str, conditions: &[Condition]) {
    if conditions.is_empty() {
        return;
    }
    // Free-form predicates are parenthesized once they share the clause.
    let grouped = conditions.len() > 1;
    c.text(keyword);
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            c.text(" and ");
        }
        write_condition(c, cond, grouped);
    }
}

fn write_condition(c: &mut Compiler, cond: &Condition, grouped: bool) {
    match cond {
        Condition::Compare { field, op, value } => {
            c.slot(SlotKind::SoftIdentifier, field.clone()).text(" ").text(op).text(" ");
            let is_list_op = op == "in" || op == "not in";
            if is_list_op && !matches!(value, Arg::Query(_)) {
                c.text("(").slot(SlotKind::Value, value.clone()).text(")");
            } else {
                c.slot(SlotKind::Value, value.clone());
            }
        }
        Condition::In {
            field,
            values,
            negated,
        } => {
            if values.is_empty() {
                c.text(if *negated { "1 = 1" } else { "1 = 0" });
                return;
            }
            c.slot(SlotKind::SoftIdentifier, field.clone());
            c.text(if *negated { " not in (" } else { " in (" });
            c.list(values, |c, v| {
                c.slot(SlotKind::Value, Arg::Value(v.clone()));
            });
            c.text(")");
        }
        Condition::Null { field, negated } => {
            c.slot(SlotKind::SoftIdentifier, field.clone());
            c.text(if *negated { " is not null" } else { " is null" });
        }
        Condition::Expr(expr) => {
            if grouped {
                c.text("(").slot(SlotKind::Value, Arg::Expr(expr.clone())).text(")");
            } else {
                c.slot(SlotKind::Value, Arg::Expr(expr.clone()));
            }
        }
    }
}
