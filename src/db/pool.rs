//! SQLite connection pool.
//!
//! Idle connections sit on a LIFO stack so the most recently released (warm)
//! connection is handed out first. All bookkeeping lives behind one mutex and
//! callers waiting for a free slot park on a condition variable that every
//! release and shutdown notifies.

use crate::db::config::DbConfig;
use crate::db::pragmas::apply_pragmas;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::ops::Deref;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

struct PoolState {
    idle: Vec<Connection>,
    /// Physically open pool connections, idle plus checked out.
    active: usize,
    open: bool,
    /// Bumped by every shutdown so stragglers released afterwards leave `active` alone.
    generation: u64,
    /// Connections from earlier generations still checked out. They hold a
    /// slot until released.
    stragglers: usize,
}

pub struct ConnectionPool {
    config: DbConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl ConnectionPool {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                active: 0,
                open: false,
                generation: 0,
                stragglers: 0,
            }),
            available: Condvar::new(),
        }
    }

    // Nothing panics while the state is half-updated, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open and configure a fresh connection to the database file.
    pub fn open_connection(&self) -> AppResult<Connection> {
        let conn = Connection::open(&self.config.database).map_err(AppError::Connection)?;
        apply_pragmas(&conn, &self.config).map_err(AppError::Connection)?;
        debug!(path = %self.config.database.display(), "opened connection");
        Ok(conn)
    }

    /// Pre-open `prefill` connections and start handing them out.
    pub fn start(&self, prefill: usize) -> AppResult<()> {
        let room = self
            .config
            .max_connections
            .saturating_sub(self.lock().stragglers);
        let prefill = prefill.min(room);

        let mut opened = Vec::with_capacity(prefill);
        for _ in 0..prefill {
            opened.push(self.open_connection()?);
        }

        let mut state = self.lock();
        state.active += opened.len();
        state.idle.extend(opened);
        state.open = true;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// `(active, idle)` counters.
    pub fn counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.active, state.idle.len())
    }

    pub fn max_connections(&self) -> usize {
        self.config.max_connections
    }

    /// Check out a connection, waiting up to `timeout` (forever if `None`)
    /// when every slot is in use.
    pub fn acquire(&self, timeout: Option<Duration>) -> AppResult<PooledConnection<'_>> {
        let started = Instant::now();
        let mut state = self.lock();

        loop {
            if !state.open {
                return Err(AppError::NotInitialized);
            }

            if let Some(conn) = state.idle.pop() {
                let generation = state.generation;
                debug!(
                    active = state.active,
                    idle = state.idle.len(),
                    "checked out pooled connection"
                );
                return Ok(PooledConnection::new(self, conn, generation));
            }

            if state.active + state.stragglers < self.config.max_connections {
                // Reserve the slot, then open outside the lock.
                state.active += 1;
                let generation = state.generation;
                drop(state);

                return match self.open_connection() {
                    Ok(conn) => Ok(PooledConnection::new(self, conn, generation)),
                    Err(e) => {
                        error!(error = %e, "failed to open pooled connection");
                        self.forget_slot(generation);
                        Err(e)
                    }
                };
            }

            state = match timeout {
                None => self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(limit) => {
                    let waited = started.elapsed();
                    if waited >= limit {
                        warn!(
                            max_connections = self.config.max_connections,
                            ?waited,
                            "connection pool exhausted"
                        );
                        return Err(AppError::PoolExhausted {
                            max_connections: self.config.max_connections,
                            waited,
                        });
                    }
                    let (guard, _) = self
                        .available
                        .wait_timeout(state, limit - waited)
                        .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
            };
        }
    }

    fn forget_slot(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation {
            state.active = state.active.saturating_sub(1);
        } else {
            state.stragglers = state.stragglers.saturating_sub(1);
        }
        drop(state);
        self.available.notify_one();
    }

    /// Return a connection: back onto the idle stack when there is room,
    /// otherwise close it and free its slot. The slot is freed even when the
    /// close itself fails.
    fn give_back(&self, conn: Connection, generation: u64) -> AppResult<()> {
        // A panicking unit of work can leave a transaction open.
        let conn = match reset_transaction(conn) {
            Some(conn) => conn,
            None => {
                self.forget_slot(generation);
                return Ok(());
            }
        };

        let mut state = self.lock();
        if state.open
            && state.generation == generation
            && state.idle.len() < self.config.max_connections
        {
            state.idle.push(conn);
            debug!(
                active = state.active,
                idle = state.idle.len(),
                "released connection to pool"
            );
            drop(state);
            self.available.notify_one();
            return Ok(());
        }
        drop(state);

        let closed = close_connection(conn);
        self.forget_slot(generation);
        closed
    }

    /// Close every idle connection, zero the counters and wake all waiters.
    /// Connections still checked out keep counting against `max_connections`
    /// until they come back. Returns the number of connections closed.
    pub fn shutdown(&self) -> usize {
        let mut state = self.lock();
        state.open = false;
        state.generation += 1;
        state.stragglers += state.active.saturating_sub(state.idle.len());
        state.active = 0;
        let idle = std::mem::take(&mut state.idle);
        drop(state);
        self.available.notify_all();

        let count = idle.len();
        for conn in idle {
            // close_connection already logs failures
            let _ = close_connection(conn);
        }
        count
    }
}

fn reset_transaction(conn: Connection) -> Option<Connection> {
    if conn.is_autocommit() {
        return Some(conn);
    }

    warn!("connection released with an open transaction, rolling back");
    match conn.execute_batch("ROLLBACK") {
        Ok(()) => Some(conn),
        Err(e) => {
            error!(error = %e, "rollback on release failed, discarding connection");
            let _ = close_connection(conn);
            None
        }
    }
}

/// Physically close a connection, logging failures.
pub fn close_connection(conn: Connection) -> AppResult<()> {
    match conn.close() {
        Ok(()) => {
            debug!("closed connection");
            Ok(())
        }
        Err((_conn, e)) => {
            error!(error = %e, "failed to close connection");
            Err(AppError::Connection(e))
        }
    }
}

/// A connection checked out of a [`ConnectionPool`].
///
/// Dropping the guard releases the connection; [`PooledConnection::release`]
/// does the same and reports close failures to the caller.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
    generation: u64,
}

impl<'a> PooledConnection<'a> {
    fn new(pool: &'a ConnectionPool, conn: Connection, generation: u64) -> Self {
        Self {
            pool,
            conn: Some(conn),
            generation,
        }
    }

    pub fn release(mut self) -> AppResult<()> {
        match self.conn.take() {
            Some(conn) => self.pool.give_back(conn, self.generation),
            None => Ok(()),
        }
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `release` and `drop` take the connection, and both consume the guard.
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("pooled connection used after release"))
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // give_back logs close failures
            let _ = self.pool.give_back(conn, self.generation);
        }
    }
}
