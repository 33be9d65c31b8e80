//! End-to-end statement building through the public API.
//!
//! These tests exercise whole statements the way a caller would write
//! them: schema declarations, condition algebra, additions, and the
//! final split into SQL text and bound values.

use stanza_core::addition::{desc, Assignment, OnConflict};
use stanza_core::schema::{bigint, col, table, timestamp, varchar, Key, Table};
use stanza_core::statement::{delete, insert, select, select_all, update, with};
use stanza_core::value::ToValue;
use stanza_core::{and, or, Cond, RenderOptions, SqlExpr, Value};

fn users() -> Table {
    table("t_user")
        .column(bigint("f_id").auto_increment())
        .column(varchar("f_name", 64).not_null())
        .column(varchar("f_mail", 128))
        .column(timestamp("f_created").not_null())
        .key(Key::primary(&["f_id"]))
        .key(Key::unique("u_mail", &["f_mail"]))
        .build()
        .unwrap()
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn test_nested_condition_grouping() {
    let cond = and([
        col("a").eq(1),
        or([col("b").eq(2), col("c").eq(3)]),
    ]);
    let (sql, values) = cond.expr(RenderOptions::new()).into_parts();
    assert_eq!(sql, "(a = ?) AND ((b = ?) OR (c = ?))");
    assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_nil_branches_collapse() {
    let cond = and([col("a").eq(1), Cond::None, Cond::None]);
    let (sql, _) = cond.expr(RenderOptions::new()).into_parts();
    assert_eq!(sql, "a = ?");

    let all_nil = and([Cond::None, Cond::None]);
    assert!(all_nil.is_nil());
}

#[test]
fn test_slice_expansion_in_condition() {
    let cond = col("id").in_list([1i64, 2, 3]);
    let (sql, values) = cond.expr(RenderOptions::new()).into_parts();
    assert_eq!(sql, "id IN (?,?,?)");
    assert_eq!(values.len(), 3);
}

#[test]
fn test_empty_in_list_is_nil() {
    let cond = col("id").in_list(Vec::<i64>::new());
    assert!(cond.is_nil());

    let (sql, _) = select_all()
        .from(users())
        .where_clause(cond)
        .build();
    assert_eq!(sql, "SELECT * FROM t_user");
}

// =============================================================================
// SELECT
// =============================================================================

#[test]
fn test_select_with_everything() {
    let (sql, values) = select([col("f_name"), col("f_mail")])
        .from(users())
        .where_clause(col("f_name").like("a%"))
        .order_by([desc(col("f_id"))])
        .limit_offset(10, 20)
        .build();
    assert_eq!(
        sql,
        "SELECT f_name, f_mail FROM t_user WHERE f_name LIKE ? \
         ORDER BY f_id DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(values, vec![Value::Text("a%".into())]);
}

#[test]
fn test_subquery_in_where() {
    let orders = table("t_order")
        .column(bigint("f_user_id"))
        .build()
        .unwrap();
    let sub = select([col("f_user_id")])
        .from(orders)
        .where_clause(col("f_user_id").gt(100));

    let (sql, values) = select_all()
        .from(users())
        .where_clause(col("f_id").in_one(sub))
        .build();
    assert_eq!(
        sql,
        "SELECT * FROM t_user WHERE f_id IN \
         (SELECT f_user_id FROM t_order WHERE f_user_id > ?)"
    );
    assert_eq!(values, vec![Value::Int(100)]);
}

// =============================================================================
// INSERT / UPDATE / DELETE
// =============================================================================

#[test]
fn test_insert_update_delete_round() {
    let (sql, values) = insert(users())
        .columns([col("f_name"), col("f_mail")])
        .row(vec!["alice".to_value(), "a@example.com".to_value()])
        .build();
    assert_eq!(
        sql,
        "INSERT INTO t_user (f_name, f_mail) VALUES (?, ?)"
    );
    assert_eq!(values.len(), 2);

    let (sql, values) = update(users())
        .set(col("f_mail"), "b@example.com")
        .where_clause(col("f_id").eq(1))
        .build();
    assert_eq!(sql, "UPDATE t_user SET f_mail = ? WHERE f_id = ?");
    assert_eq!(values.len(), 2);

    let (sql, values) = delete(users()).where_clause(col("f_id").eq(1)).build();
    assert_eq!(sql, "DELETE FROM t_user WHERE f_id = ?");
    assert_eq!(values, vec![Value::Int(1)]);
}

#[test]
fn test_upsert() {
    let (sql, values) = insert(users())
        .columns([col("f_id"), col("f_name")])
        .row(vec![1i64.to_value(), "alice".to_value()])
        .on_conflict(OnConflict::DoUpdate {
            columns: vec![String::from("f_id")],
            assignments: vec![Assignment::set(col("f_name"), "alice")],
        })
        .build();
    assert_eq!(
        sql,
        "INSERT INTO t_user (f_id, f_name) VALUES (?, ?) \
         ON CONFLICT (f_id) DO UPDATE SET f_name = ?"
    );
    assert_eq!(values.len(), 3);
}

// =============================================================================
// WITH
// =============================================================================

#[test]
fn test_cte_wraps_main_query() {
    let recent = table("recent").column(bigint("f_id")).build().unwrap();
    let body = select([col("f_id")])
        .from(users())
        .where_clause(col("f_created").is_not_null());

    let (sql, _) = with(select_all().from(recent))
        .cte("recent", &["f_id"], body)
        .build();
    assert_eq!(
        sql,
        "WITH recent (f_id) AS \
         (SELECT f_id FROM t_user WHERE f_created IS NOT NULL) \
         SELECT * FROM recent"
    );
}

// =============================================================================
// Values never land in the SQL text
// =============================================================================

#[test]
fn test_text_values_are_always_parameterized() {
    let hostile = "'; DROP TABLE t_user; --";
    let (sql, values) = select_all()
        .from(users())
        .where_clause(col("f_name").eq(hostile))
        .build();
    assert_eq!(sql, "SELECT * FROM t_user WHERE f_name = ?");
    assert_eq!(values, vec![Value::Text(hostile.into())]);
}

#[test]
fn test_byte_values_stay_scalar() {
    let blob: Vec<u8> = vec![1, 2, 3];
    let (sql, values) = select_all()
        .from(users())
        .where_clause(col("f_name").eq(blob.clone()))
        .build();
    assert_eq!(sql, "SELECT * FROM t_user WHERE f_name = ?");
    assert_eq!(values, vec![Value::Bytes(blob)]);
}
