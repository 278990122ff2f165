//! End-to-end checks against an in-memory SQLite database.

#![cfg(feature = "sqlite")]

use futures_util::StreamExt;
use sqlcraft::{
    Arg, Connection, Dialect, Expression, SqlError, SqlResult, SqliteDialect, Value, args,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

async fn connect() -> Connection<SqlitePool> {
    // One connection keeps the in-memory database alive for the whole test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    Connection::new(pool)
}

async fn with_employees() -> SqlResult<Connection<SqlitePool>> {
    let conn = connect().await;
    conn.expr(
        "create table employee (
            id integer primary key,
            name varchar(50),
            surname varchar(50),
            retired boolean
        )",
    )
    .execute(&conn)
    .await?;

    let fixture = [
        (1, "Oliver", "Smith", false),
        (2, "Jack", "Williams", true),
        (3, "Harry", "Taylor", true),
        (4, "Charlie", "Lee", false),
    ];
    for (id, name, surname, retired) in fixture {
        conn.dsql()
            .table("employee")
            .set("id", id)
            .set("name", name)
            .set("surname", surname)
            .set("retired", retired)
            .insert(&conn)
            .await?;
    }
    Ok(conn)
}

#[tokio::test]
async fn static_expressions_evaluate() -> SqlResult<()> {
    let conn = connect().await;
    assert_eq!(conn.expr("select 3+4").to_scalar_string(&conn).await?, "7");
    assert_eq!(conn.dsql().field(Expression::new("2+2")).to_scalar_string(&conn).await?, "4");
    Ok(())
}

#[tokio::test]
async fn null_binds_through_coalesce() -> SqlResult<()> {
    let conn = connect().await;
    let five = conn
        .expr("select coalesce([], '5')")
        .arg(Value::Null)
        .to_scalar_string(&conn)
        .await?;
    assert_eq!(five, "5");
    Ok(())
}

#[tokio::test]
async fn boolean_filter_keeps_insertion_order() -> SqlResult<()> {
    let conn = with_employees().await?;
    let rows = conn
        .dsql()
        .table("employee")
        .field("id, name")
        .where_("retired", false)
        .get_rows(&conn)
        .await?;

    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).cloned().collect();
    assert_eq!(names, vec![Value::from("Oliver"), Value::from("Charlie")]);

    let retired = conn
        .dsql()
        .table("employee")
        .field("retired")
        .where_("id", 2)
        .get_one(&conn)
        .await?;
    assert_eq!(retired, Value::Bool(true));
    Ok(())
}

#[tokio::test]
async fn text_and_integer_flags_compare_as_booleans() -> SqlResult<()> {
    let conn = with_employees().await?;
    let first_retired = conn
        .dsql()
        .table("employee")
        .field("surname")
        .where_("retired", "1")
        .get_row(&conn)
        .await?;
    assert_eq!(first_retired.get("surname"), Some(&Value::from("Williams")));

    let rows = conn
        .dsql()
        .table("employee")
        .field("name")
        .where_("retired", 1)
        .where_expr(Expression::with_args(
            "{}=[] or {}=[]",
            args![Arg::ident("surname"), "Williams", Arg::ident("surname"), "Smith"],
        ))
        .get_rows(&conn)
        .await?;
    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).cloned().collect();
    assert_eq!(names, vec![Value::from("Jack")]);
    Ok(())
}

#[tokio::test]
async fn scalar_conversion_is_repeatable() -> SqlResult<()> {
    let conn = with_employees().await?;
    let q = conn.dsql().table("employee").field("surname").where_("name", "Jack");
    assert_eq!(q.to_scalar_string(&conn).await?, "Williams");
    assert_eq!(q.to_scalar_string(&conn).await?, "Williams");
    Ok(())
}

#[tokio::test]
async fn query_nests_as_a_scalar_subselect() -> SqlResult<()> {
    let conn = with_employees().await?;
    let surname = conn.dsql().table("employee").field("surname").where_("name", "Jack");
    let greeting = conn
        .expr("select 'Hello, ' || []")
        .arg(surname)
        .to_scalar_string(&conn)
        .await?;
    assert_eq!(greeting, "Hello, Williams");
    Ok(())
}

#[tokio::test]
async fn or_conditions_through_where_expr() -> SqlResult<()> {
    let conn = with_employees().await?;
    let rows = conn
        .dsql()
        .table("employee")
        .field("name")
        .where_expr(Expression::with_args(
            "{}=[] or {}=[]",
            args![Arg::ident("surname"), "Smith", Arg::ident("surname"), "Lee"],
        ))
        .order("id")
        .get_rows(&conn)
        .await?;
    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).cloned().collect();
    assert_eq!(names, vec![Value::from("Oliver"), Value::from("Charlie")]);
    Ok(())
}

#[tokio::test]
async fn write_operations_end_to_end() -> SqlResult<()> {
    let conn = connect().await;
    conn.expr("create table employee (id integer primary key, name varchar(50))")
        .execute(&conn)
        .await?;

    let table = conn.dsql().table("employee");
    table.clone().set("id", 1).set("name", "John").insert(&conn).await?;
    table.clone().set("id", 2).set("name", "Jane").insert(&conn).await?;

    let updated = table
        .clone()
        .set("name", "Johnny")
        .where_("id", 1)
        .update(&conn)
        .await?;
    assert_eq!(updated, 1);

    let rows = table.clone().field("id, name").order("id").get_rows(&conn).await?;
    let pairs: Vec<_> = rows.into_iter().map(|r| r.into_pairs()).collect();
    assert_eq!(
        pairs,
        vec![
            vec![("id".to_string(), Value::Int(1)), ("name".to_string(), Value::from("Johnny"))],
            vec![("id".to_string(), Value::Int(2)), ("name".to_string(), Value::from("Jane"))],
        ]
    );

    table.clone().set("id", 1).set("name", "Peter").replace(&conn).await?;
    let names = table.clone().field("name").order("id").get_rows(&conn).await?;
    let names: Vec<_> = names.iter().filter_map(|r| r.get("name")).cloned().collect();
    assert_eq!(names, vec![Value::from("Peter"), Value::from("Jane")]);

    let deleted = table.clone().where_("id", 1).delete(&conn).await?;
    assert_eq!(deleted, 1);
    assert_eq!(table.clone().field(Expression::new("count(*)")).to_scalar_string(&conn).await?, "1");

    table.truncate(&conn).await?;
    assert!(table.get_rows(&conn).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_results() -> SqlResult<()> {
    let conn = with_employees().await?;
    let q = conn.dsql().table("employee").field("name").where_("id", 99);

    assert!(q.get_rows(&conn).await?.is_empty());
    assert!(q.try_get_row(&conn).await?.is_none());
    assert!(q.get_row(&conn).await.unwrap_err().is_empty_result());
    assert!(q.get_one(&conn).await.unwrap_err().is_empty_result());
    assert!(q.to_scalar_string(&conn).await.unwrap_err().is_empty_result());
    Ok(())
}

#[tokio::test]
async fn execution_errors_carry_native_code_and_debug_query() {
    let conn = connect().await;
    let err = conn
        .expr("select {} from {}")
        .arg(Arg::ident("non_existing_field"))
        .arg(Arg::ident("non_existing_table"))
        .get_rows(&conn)
        .await
        .unwrap_err();

    assert!(err.is_execute(), "{err:?}");
    assert_eq!(err.code(), Some("1"));
    let debug = err.debug_query().unwrap_or_default();
    assert_eq!(
        SqliteDialect.unquote_identifier(debug),
        "select non_existing_field from non_existing_table"
    );
    assert!(matches!(err, SqlError::Execute(ref e) if e.message.contains("no such table")));
}

#[tokio::test]
async fn streams_rerun_on_every_call() -> SqlResult<()> {
    let conn = with_employees().await?;
    let q = conn.dsql().table("employee").field("name").order("id");

    let mut stream = q.stream(&conn);
    let first = stream.next().await.transpose()?;
    assert_eq!(first.and_then(|r| r.get("name").cloned()), Some(Value::from("Oliver")));
    drop(stream);

    conn.dsql()
        .table("employee")
        .set("id", 5)
        .set("name", "Amelia")
        .insert(&conn)
        .await?;
    let all = q.stream(&conn).try_collect().await?;
    assert_eq!(all.len(), 5);
    Ok(())
}
