//! Statement helpers shared by the manager façade and transactional work.
//!
//! Every failure is wrapped into [`AppError::Query`] with the SQL text and
//! the bound parameters attached.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use serde::Serialize;

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub changes: usize,
    pub last_insert_id: i64,
}

pub fn query<T, F>(conn: &Connection, sql: &str, params: &[&dyn ToSql], map: F) -> AppResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    query_rows(conn, sql, params, map).map_err(|e| AppError::query(sql, params, e))
}

fn query_rows<T, F>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
    map: F,
) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(rows)
}

/// First row of the result, if any.
pub fn query_single<T, F>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
    map: F,
) -> AppResult<Option<T>>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    conn.prepare_cached(sql)
        .and_then(|mut stmt| stmt.query_row(params, map).optional())
        .map_err(|e| AppError::query(sql, params, e))
}

/// Fail unless `sql` leaves the database untouched when stepped.
pub fn ensure_read_only(conn: &Connection, sql: &str) -> AppResult<()> {
    let stmt = conn
        .prepare_cached(sql)
        .map_err(|e| AppError::query(sql, &[], e))?;
    if stmt.readonly() {
        Ok(())
    } else {
        Err(AppError::Other(format!(
            "statement modifies the database, run it with `exec`: {}",
            sql.trim()
        )))
    }
}

pub fn update(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> AppResult<UpdateResult> {
    let changes = conn
        .prepare_cached(sql)
        .and_then(|mut stmt| stmt.execute(params))
        .map_err(|e| AppError::query(sql, params, e))?;

    Ok(UpdateResult {
        changes,
        last_insert_id: conn.last_insert_rowid(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)")
            .unwrap();
        conn
    }

    #[test]
    fn update_reports_changes_and_rowid() {
        let conn = conn();
        let res = update(&conn, "INSERT INTO t (name) VALUES (?1)", params!["a"]).unwrap();
        assert_eq!(
            res,
            UpdateResult {
                changes: 1,
                last_insert_id: 1
            }
        );

        update(&conn, "INSERT INTO t (name) VALUES (?1)", params!["b"]).unwrap();
        let res = update(&conn, "UPDATE t SET name = name || '!'", params![]).unwrap();
        assert_eq!(res.changes, 2);
    }

    #[test]
    fn query_single_returns_none_for_no_rows() {
        let conn = conn();
        let got: Option<String> = query_single(
            &conn,
            "SELECT name FROM t WHERE id = ?1",
            params![99],
            |row| row.get(0),
        )
        .unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn constraint_violation_is_a_query_error() {
        let conn = conn();
        update(&conn, "INSERT INTO t (name) VALUES (?1)", params!["dup"]).unwrap();
        let err = update(&conn, "INSERT INTO t (name) VALUES (?1)", params!["dup"]).unwrap_err();

        match err {
            AppError::Query { sql, params, .. } => {
                assert_eq!(sql, "INSERT INTO t (name) VALUES (?1)");
                assert_eq!(params, "[\"dup\"]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_selects_pass_the_read_only_check() {
        let conn = conn();
        ensure_read_only(&conn, "SELECT name FROM t").unwrap();

        for sql in ["DELETE FROM t", "INSERT INTO t (name) VALUES ('x')", "DROP TABLE t"] {
            let err = ensure_read_only(&conn, sql).unwrap_err();
            assert!(matches!(err, AppError::Other(ref m) if m.contains("exec")), "{sql}");
        }
    }

    #[test]
    fn query_maps_every_row() {
        let conn = conn();
        for name in ["x", "y", "z"] {
            update(&conn, "INSERT INTO t (name) VALUES (?1)", params![name]).unwrap();
        }
        let names: Vec<String> =
            query(&conn, "SELECT name FROM t ORDER BY id", params![], |row| row.get(0)).unwrap();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
