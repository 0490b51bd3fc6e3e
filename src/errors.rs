//! Unified application error type.
//! The pool, the query façade, migrations and the CLI all return AppError so
//! callers only ever match on one enum.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Pool lifecycle
    // ---------------------------
    #[error("Database initialization failed: {0}")]
    Initialization(#[source] Box<AppError>),

    #[error("Connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("Connection pool exhausted: {max_connections} connection(s) in use after waiting {waited:?}")]
    PoolExhausted {
        max_connections: usize,
        waited: Duration,
    },

    #[error("Database manager is not initialized")]
    NotInitialized,

    // ---------------------------
    // Statements
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Query failed: {source} (sql: {sql}, params: {params})")]
    Query {
        sql: String,
        params: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Transaction {stage} failed: {source}")]
    Transaction {
        stage: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Backup error: {0}")]
    Backup(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Wrap a statement failure with the SQL text and its bound parameters.
    pub fn query(sql: &str, params: &[&dyn ToSql], source: rusqlite::Error) -> Self {
        AppError::Query {
            sql: sql.trim().to_string(),
            params: describe_params(params),
            source,
        }
    }
}

/// Render bound parameters for error messages and logs.
pub fn describe_params(params: &[&dyn ToSql]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|p| match p.to_sql() {
            Ok(out) => render_output(&out),
            Err(_) => "<unrenderable>".to_string(),
        })
        .collect();

    format!("[{}]", rendered.join(", "))
}

fn render_output(out: &ToSqlOutput<'_>) -> String {
    let value = match out {
        ToSqlOutput::Borrowed(v) => *v,
        ToSqlOutput::Owned(v) => ValueRef::from(v),
        other => return format!("{other:?}"),
    };

    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => format!("{:?}", String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

pub type AppResult<T> = Result<T, AppError>;
