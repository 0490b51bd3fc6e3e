use fdtsdb::db::exec::{query_single, update};
use fdtsdb::errors::AppError;
use rusqlite::params;

mod common;
use common::{count_items, create_items_table, manager_with};

#[test]
fn committed_writes_are_visible() {
    let (_env, manager) = manager_with(3);
    create_items_table(&manager);

    let last_id = manager
        .execute_transaction(|conn| {
            update(conn, "INSERT INTO items (name) VALUES (?1)", params!["a"])?;
            let res = update(conn, "INSERT INTO items (name) VALUES (?1)", params!["b"])?;
            Ok(res.last_insert_id)
        })
        .unwrap();

    assert_eq!(last_id, 2);
    assert_eq!(count_items(&manager), 2);
}

#[test]
fn failing_work_rolls_back_and_returns_its_error() {
    let (_env, manager) = manager_with(3);
    create_items_table(&manager);

    let err = manager
        .execute_transaction(|conn| -> Result<(), AppError> {
            update(conn, "INSERT INTO items (name) VALUES (?1)", params!["ghost"])?;
            update(conn, "INSERT INTO items (name) VALUES (?1)", params!["ghost-2"])?;
            Err(AppError::Other("boom".into()))
        })
        .unwrap_err();

    assert!(matches!(err, AppError::Other(ref m) if m == "boom"));

    let rows: Vec<String> = manager
        .execute_query("SELECT name FROM items", &[], |row| row.get(0))
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn failing_statement_inside_work_rolls_back_earlier_writes() {
    let (_env, manager) = manager_with(2);
    create_items_table(&manager);

    let err = manager
        .execute_transaction(|conn| {
            update(conn, "INSERT INTO items (name) VALUES (?1)", params!["ok"])?;
            // NOT NULL violation
            update(conn, "INSERT INTO items (name) VALUES (NULL)", params![])?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, AppError::Query { .. }));
    assert_eq!(count_items(&manager), 0);
}

#[test]
fn commit_failure_is_reported_and_rolled_back() {
    let (_env, manager) = manager_with(2);
    manager
        .execute_update("CREATE TABLE parent (id INTEGER PRIMARY KEY)", &[])
        .unwrap();
    manager
        .execute_update(
            "CREATE TABLE child (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED
            )",
            &[],
        )
        .unwrap();

    // the dangling reference is only detected at COMMIT
    let err = manager
        .execute_transaction(|conn| {
            update(conn, "INSERT INTO child (parent_id) VALUES (?1)", params![7])?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, AppError::Transaction { stage: "COMMIT", .. }));

    let children: Option<i64> = manager
        .execute_query_single("SELECT COUNT(*) FROM child", &[], |row| row.get(0))
        .unwrap();
    assert_eq!(children, Some(0));

    // every pooled connection is usable again
    manager
        .execute_transaction(|conn| {
            update(conn, "INSERT INTO parent (id) VALUES (?1)", params![7])?;
            update(conn, "INSERT INTO child (parent_id) VALUES (?1)", params![7])?;
            Ok(())
        })
        .unwrap();
}

#[test]
fn rollback_failure_keeps_original_error() {
    let (_env, manager) = manager_with(1);
    create_items_table(&manager);

    // the work ends the transaction itself, so the ROLLBACK that follows fails
    let err = manager
        .execute_transaction(|conn| -> Result<(), AppError> {
            conn.execute_batch("INSERT INTO items (name) VALUES ('kept'); COMMIT;")?;
            Err(AppError::Other("orig".into()))
        })
        .unwrap_err();

    assert!(matches!(err, AppError::Other(ref m) if m == "orig"));
    assert_eq!(manager.connection_counts(), (1, 1));
    assert_eq!(count_items(&manager), 1);
}

#[test]
fn transaction_releases_its_connection() {
    let (_env, manager) = manager_with(1);
    create_items_table(&manager);

    for _ in 0..3 {
        let _ = manager.execute_transaction(|_| -> Result<(), AppError> {
            Err(AppError::Other("nope".into()))
        });
    }
    manager.execute_transaction(|_| Ok(())).unwrap();

    assert_eq!(manager.connection_counts(), (1, 1));
}

#[test]
fn work_sees_its_own_uncommitted_writes() {
    let (_env, manager) = manager_with(2);
    create_items_table(&manager);

    let seen = manager
        .execute_transaction(|conn| {
            update(conn, "INSERT INTO items (name) VALUES (?1)", params!["inside"])?;
            query_single(conn, "SELECT name FROM items WHERE id = 1", params![], |row| {
                row.get::<_, String>(0)
            })
        })
        .unwrap();

    assert_eq!(seen.as_deref(), Some("inside"));
}
