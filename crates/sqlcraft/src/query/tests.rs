use super::*;
use crate::backend::mock::{MockBackend, Reply, row};
use crate::connection::Connection;
use crate::dialect::{
    Dialect, DialectKind, MssqlDialect, MysqlDialect, OracleDialect, PostgresDialect,
    SqliteDialect,
};
use crate::error::SqlError;

fn sql(q: &Query, d: &dyn Dialect) -> String {
    q.render(d).unwrap().sql
}

#[test]
fn select_defaults_to_star() {
    let q = Query::new().table("employee");
    assert_eq!(sql(&q, &SqliteDialect), r#"select * from "employee""#);
}

#[test]
fn field_lists_split_on_commas() {
    let q = Query::new().table("employee").field("name, surname");
    assert_eq!(
        sql(&q, &PostgresDialect),
        r#"select "name", "surname" from "employee""#
    );

    let q = Query::new().table("employee").field("concat(name, surname)");
    assert_eq!(
        sql(&q, &PostgresDialect),
        r#"select concat(name, surname) from "employee""#
    );
}

#[test]
fn field_and_table_aliases() {
    let q = Query::new()
        .table_as("employee", "e")
        .field_as("e.name", "n")
        .field("e.*");
    assert_eq!(
        sql(&q, &MysqlDialect),
        "select `e`.`name` as `n`, `e`.* from `employee` `e`"
    );
}

#[test]
fn tableless_select() {
    let q = Query::new().field(Expression::new("2+2"));
    assert_eq!(sql(&q, &SqliteDialect), "select 2+2");
    assert_eq!(sql(&q, &OracleDialect), "select 2+2 from dual");
}

#[test]
fn where_binds_values() {
    let q = Query::new()
        .table("employee")
        .field("id")
        .where_("retired", false)
        .where_op("id", ">=", 2);
    let r = q.render(&PostgresDialect).unwrap();
    assert_eq!(
        r.sql,
        r#"select "id" from "employee" where "retired" = $1 and "id" >= $2"#
    );
    assert_eq!(r.params, vec![Value::Bool(false), Value::Int(2)]);

    let r = q.render(&SqliteDialect).unwrap();
    assert_eq!(r.params, vec![Value::Int(0), Value::Int(2)]);
}

#[test]
fn null_comparisons_become_is_null() {
    let q = Query::new()
        .table("employee")
        .where_("manager_id", Value::Null)
        .where_op("boss_id", "!=", None::<i64>);
    assert_eq!(
        sql(&q, &SqliteDialect),
        r#"select * from "employee" where "manager_id" is null and "boss_id" is not null"#
    );
}

#[test]
fn where_expression_keeps_its_own_logic() {
    let cond = Expression::new("{}=[] or {}=[]")
        .arg(Arg::ident("name"))
        .arg("John")
        .arg(Arg::ident("surname"))
        .arg("Doe");

    let q = Query::new().table("employee").where_expr(cond.clone());
    let r = q.render(&SqliteDialect).unwrap();
    assert_eq!(
        r.sql,
        r#"select * from "employee" where "name"=? or "surname"=?"#
    );
    assert_eq!(r.params, vec![Value::from("John"), Value::from("Doe")]);

    let q = q.where_("retired", true);
    assert_eq!(
        sql(&q, &SqliteDialect),
        r#"select * from "employee" where ("name"=? or "surname"=?) and "retired" = ?"#
    );
}

#[test]
fn where_in_lists() {
    let q = Query::new().table("employee").where_in("id", [1, 2, 3]);
    assert_eq!(
        sql(&q, &PostgresDialect),
        r#"select * from "employee" where "id" in ($1, $2, $3)"#
    );

    let q = Query::new().table("employee").where_in("id", Vec::<i64>::new());
    assert_eq!(sql(&q, &PostgresDialect), r#"select * from "employee" where 1 = 0"#);

    let q = Query::new().table("employee").where_not_in("id", Vec::<i64>::new());
    assert_eq!(sql(&q, &PostgresDialect), r#"select * from "employee" where 1 = 1"#);
}

#[test]
fn in_operator_with_subquery() {
    let managers = Query::new().table("employee").field("manager_id");
    let q = Query::new()
        .table("employee")
        .field("name")
        .where_op("id", "IN", managers);
    assert_eq!(
        sql(&q, &SqliteDialect),
        r#"select "name" from "employee" where "id" in (select "manager_id" from "employee")"#
    );
}

#[test]
fn unsupported_operator_is_reported_at_render() {
    let q = Query::new().table("employee").where_op("id", "~~", 1);
    let err = q.render(&SqliteDialect).unwrap_err();
    assert!(matches!(err, SqlError::InvalidQuery(ref m) if m.contains("~~")));

    let q = Query::new().table("employee").where_op("id", "<", Value::Null);
    assert!(matches!(q.render(&SqliteDialect), Err(SqlError::InvalidQuery(_))));
}

#[test]
fn derived_table_needs_alias() {
    let inner = Query::new().table("employee").field("name");

    let q = Query::new().table(inner.clone());
    assert!(matches!(q.render(&SqliteDialect), Err(SqlError::InvalidQuery(_))));

    let q = Query::new().table_as(inner, "t").field("t.name");
    assert_eq!(
        sql(&q, &SqliteDialect),
        r#"select "t"."name" from (select "name" from "employee") "t""#
    );
}

#[test]
fn group_having_order_limit() {
    let q = Query::new()
        .table("employee")
        .field("manager_id")
        .field_as(Expression::new("count(*)"), "c")
        .group("manager_id")
        .having_op(Expression::new("count(*)"), ">", 1)
        .order("c desc")
        .order_by("manager_id", Direction::Asc)
        .limit_offset(5, 10)
        .option("distinct");
    assert_eq!(
        sql(&q, &PostgresDialect),
        r#"select distinct "manager_id", count(*) as "c" from "employee" group by "manager_id" having count(*) > $1 order by "c" desc, "manager_id" asc limit 5 offset 10"#
    );
    assert_eq!(
        sql(&q, &MssqlDialect),
        "select distinct [manager_id], count(*) as [c] from [employee] group by [manager_id] having count(*) > @P1 order by [c] desc, [manager_id] asc offset 10 rows fetch next 5 rows only"
    );
}

#[test]
fn select_options_are_copied_as_written() {
    let q = Query::new()
        .table("employee")
        .field("name")
        .option("top [n]")
        .where_("id", 1);
    let r = q.render(&MssqlDialect).unwrap();
    assert_eq!(r.sql, "select top [n] [name] from [employee] where [id] = @P1");
    assert_eq!(r.params, vec![Value::Int(1)]);

    let q = Query::new().table("t").option("sql_no_cache {x}");
    assert_eq!(sql(&q, &MysqlDialect), "select sql_no_cache {x} * from `t`");
}

#[test]
fn insert_update_delete_statements() {
    let d = SqliteDialect;
    let q = Query::new().table("employee").set("id", 1).set("name", "John");
    let r = q.render_insert(&d).unwrap().render(&d).unwrap();
    assert_eq!(r.sql, r#"insert into "employee" ("id", "name") values (?, ?)"#);
    assert_eq!(r.params, vec![Value::Int(1), Value::from("John")]);

    let q = Query::new()
        .table("employee")
        .set("name", "Johnny")
        .where_("id", 1);
    let r = q.render_update(&d).unwrap().render(&d).unwrap();
    assert_eq!(r.sql, r#"update "employee" set "name"=? where "id" = ?"#);
    assert_eq!(r.params, vec![Value::from("Johnny"), Value::Int(1)]);

    let q = Query::new().table("employee").where_("id", 1);
    let r = q.render_delete(&d).unwrap().render(&d).unwrap();
    assert_eq!(r.sql, r#"delete from "employee" where "id" = ?"#);
}

#[test]
fn set_twice_keeps_position() {
    let q = Query::new()
        .table("employee")
        .set("id", 1)
        .set("name", "John")
        .set("id", 2);
    let r = q.render_insert(&PostgresDialect).unwrap().render(&PostgresDialect).unwrap();
    assert_eq!(r.sql, r#"insert into "employee" ("id", "name") values ($1, $2)"#);
    assert_eq!(r.params, vec![Value::Int(2), Value::from("John")]);
}

#[test]
fn unsigned_ids_bind_as_ints() {
    let ids: Vec<usize> = vec![7];
    let q = Query::new()
        .table("employee")
        .set("id", 1u64)
        .where_("id", ids.len())
        .where_("parent", u64::MAX);
    let r = q.render_update(&SqliteDialect).unwrap().render(&SqliteDialect).unwrap();
    assert_eq!(
        r.params,
        vec![Value::Int(1), Value::Int(1), Value::from("18446744073709551615")]
    );
}

#[test]
fn set_many_and_expression_values() {
    let q = Query::new()
        .table("employee")
        .set_many([("id", Arg::from(3)), ("name", Arg::raw("upper('x')"))]);
    let r = q.render_insert(&MysqlDialect).unwrap().render(&MysqlDialect).unwrap();
    assert_eq!(r.sql, "insert into `employee` (`id`, `name`) values (?, upper('x'))");
    assert_eq!(r.params, vec![Value::Int(3)]);
}

#[test]
fn replace_and_truncate_follow_the_dialect() {
    let q = Query::new().table("employee").set("id", 1);
    assert_eq!(
        q.render_replace(&MysqlDialect).unwrap().debug_query(&MysqlDialect).unwrap(),
        "replace into `employee` (`id`) values (1)"
    );
    let err = q.render_replace(&PostgresDialect).unwrap_err();
    assert!(matches!(
        err,
        SqlError::Unsupported {
            dialect: "postgresql",
            feature: "replace"
        }
    ));

    let q = Query::new().table("employee");
    assert_eq!(
        q.render_truncate(&SqliteDialect).unwrap().debug_query(&SqliteDialect).unwrap(),
        r#"delete from "employee""#
    );
    assert_eq!(
        q.render_truncate(&PostgresDialect).unwrap().debug_query(&PostgresDialect).unwrap(),
        r#"truncate table "employee""#
    );
}

#[test]
fn single_operation_typing() {
    let d = SqliteDialect;
    let staged = Query::new().table("employee").set("name", "x");
    assert!(matches!(staged.render_delete(&d), Err(SqlError::InvalidQuery(_))));
    assert!(matches!(staged.render_truncate(&d), Err(SqlError::InvalidQuery(_))));

    let empty = Query::new().table("employee");
    assert!(matches!(empty.render_insert(&d), Err(SqlError::InvalidQuery(_))));
    assert!(matches!(empty.render_update(&d), Err(SqlError::InvalidQuery(_))));

    let filtered = Query::new().table("employee").set("id", 1).where_("id", 1);
    assert!(matches!(filtered.render_insert(&d), Err(SqlError::InvalidQuery(_))));

    let no_table = Query::new().set("id", 1);
    assert!(matches!(no_table.render_insert(&d), Err(SqlError::InvalidQuery(_))));

    assert!(matches!(
        empty.render_as(Operation::Raw, &d),
        Err(SqlError::InvalidQuery(_))
    ));
}

#[test]
fn rendering_does_not_consume_the_builder() {
    let q = Query::new().table("employee").field("surname").where_("name", "Jack");
    let first = q.render(&PostgresDialect).unwrap();
    let second = q.render(&PostgresDialect).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        q.debug_query(&PostgresDialect).unwrap(),
        r#"select "surname" from "employee" where "name" = 'Jack'"#
    );
}

#[tokio::test]
async fn scalar_conversion_repeats() {
    let backend = MockBackend::new(DialectKind::Sqlite)
        .reply(Reply::Rows(vec![row([("surname", Value::from("Williams"))])]))
        .reply(Reply::Rows(vec![row([("surname", Value::from("Williams"))])]));
    let conn = Connection::new(backend);
    let q = conn.dsql().table("employee").field("surname").where_("name", "Jack");

    assert_eq!(q.to_scalar_string(&conn).await.unwrap(), "Williams");
    assert_eq!(q.to_scalar_string(&conn).await.unwrap(), "Williams");

    let statements = conn.backend().statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0], statements[1]);
}

#[tokio::test]
async fn get_row_on_empty_result() {
    let conn = Connection::new(MockBackend::new(DialectKind::Sqlite));
    let q = conn.dsql().table("employee").where_("id", 99);

    assert!(q.get_row(&conn).await.unwrap_err().is_empty_result());
    assert!(q.get_one(&conn).await.unwrap_err().is_empty_result());
    assert!(q.try_get_row(&conn).await.unwrap().is_none());
    assert!(q.get_rows(&conn).await.unwrap().is_empty());
}

#[tokio::test]
async fn writes_return_affected_rows() {
    let backend = MockBackend::new(DialectKind::Mysql)
        .reply(Reply::Affected(1))
        .reply(Reply::Affected(2));
    let conn = Connection::new(backend);

    let n = conn.dsql().table("employee").set("id", 1).replace(&conn).await.unwrap();
    assert_eq!(n, 1);
    let n = conn.dsql().table("employee").truncate(&conn).await.unwrap();
    assert_eq!(n, 2);

    assert_eq!(conn.backend().last_sql(), "truncate table `employee`");
}

#[tokio::test]
async fn invalid_builder_never_reaches_the_backend() {
    let conn = Connection::new(MockBackend::new(DialectKind::Postgres));
    let err = conn.dsql().table("employee").set("id", 1).replace(&conn).await.unwrap_err();
    assert!(matches!(err, SqlError::Unsupported { .. }));
    assert!(conn.backend().statements().is_empty());
}
