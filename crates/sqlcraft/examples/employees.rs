//! Builds an employee table in an in-memory SQLite database and queries it.
//!
//! Run with: cargo run --example employees -p sqlcraft
//!
//! Set RUST_LOG=sqlcraft.sql=debug to see every statement.

use comfy_table::Table;
use sqlcraft::{Arg, Connection, ConnectionConfig, Expression, Row, SqlResult, args};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::EnvFilter;

fn print_rows(rows: &[Row]) {
    let mut table = Table::new();
    if let Some(first) = rows.first() {
        table.set_header(first.columns());
    }
    for row in rows {
        table.add_row(row.values().map(|v| v.to_string()));
    }
    println!("{table}");
}

#[tokio::main]
async fn main() -> SqlResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| sqlcraft::SqlError::Connection(e.to_string()))?;
    let conn = Connection::new(pool).with_config(
        ConnectionConfig::new().with_slow_query_threshold(std::time::Duration::from_millis(50)),
    );

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

    // ============================================
    // Insert
    // ============================================
    for (id, name, surname, retired) in [
        (1, "Oliver", "Smith", false),
        (2, "Jack", "Williams", true),
        (3, "Harry", "Taylor", true),
        (4, "Charlie", "Lee", false),
    ] {
        conn.dsql()
            .table("employee")
            .set("id", id)
            .set("name", name)
            .set("surname", surname)
            .set("retired", retired)
            .insert(&conn)
            .await?;
    }

    // ============================================
    // Select
    // ============================================
    println!("=== Active employees ===");
    let active = conn
        .dsql()
        .table("employee")
        .field("id, name, surname")
        .where_("retired", false)
        .order("id");
    println!("{}", active.debug_query(conn.dialect())?);
    print_rows(&active.get_rows(&conn).await?);

    println!("=== Smith or Lee ===");
    let either = Expression::with_args(
        "{}=[] or {}=[]",
        args![Arg::ident("surname"), "Smith", Arg::ident("surname"), "Lee"],
    );
    let rows = conn
        .dsql()
        .table("employee")
        .where_expr(either)
        .get_rows(&conn)
        .await?;
    print_rows(&rows);

    let surname = conn
        .dsql()
        .table("employee")
        .field("surname")
        .where_("name", "Jack")
        .to_scalar_string(&conn)
        .await?;
    println!("Jack's surname: {surname}");

    // ============================================
    // Update / delete
    // ============================================
    let n = conn
        .dsql()
        .table("employee")
        .set("retired", true)
        .where_("id", 2)
        .update(&conn)
        .await?;
    println!("Retired {n} employee(s)");

    let n = conn
        .dsql()
        .table("employee")
        .where_("retired", true)
        .delete(&conn)
        .await?;
    println!("Removed {n} retired employee(s)");
    print_rows(&conn.dsql().table("employee").get_rows(&conn).await?);

    // ============================================
    // Errors
    // ============================================
    let missing = conn
        .expr("select {} from {}")
        .arg(Arg::ident("non_existing_field"))
        .arg(Arg::ident("non_existing_table"));
    if let Err(err) = missing.get_rows(&conn).await {
        println!("Error: {err}");
        if let Some(query) = err.debug_query() {
            println!("Debug query: {query}");
        }
    }

    Ok(())
}
