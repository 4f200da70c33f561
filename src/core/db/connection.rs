/// Connection Management Module
///
/// `DbClient` owns the single live connection and the transaction state
/// machine shared by every table handle built on it.
///
/// Statements always run inside a transaction: the first statement after a
/// commit or rollback opens one implicitly. A failure on the raw statement
/// path leaves the transaction `Failed`, and the store then refuses every
/// statement with `StoreError::TransactionAborted` until `rollback` is
/// called.
///
/// The state lives in a `Cell`, so a client cannot be shared across threads;
/// callers that need concurrency must serialize access themselves.
use crate::config::DatabaseConfig;
use crate::core::db::query::StatementType;
use crate::core::{Result, StoreError};
use rusqlite::Connection;
use std::cell::Cell;
use tracing::{debug, error, info, warn};

const IN_MEMORY: &str = ":memory:";

const BEGIN: &str = "BEGIN";
const COMMIT: &str = "COMMIT";
const ROLLBACK: &str = "ROLLBACK";

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// No open transaction
    #[default]
    Idle,
    /// Transaction in progress
    Active,
    /// Transaction in failed state; only rollback is accepted
    Failed,
}

impl TransactionState {
    /// `Failed` is the aborted state; the other two are clean.
    pub fn is_aborted(self) -> bool {
        self == TransactionState::Failed
    }
}

/// Handle to one live store connection.
#[derive(Debug)]
pub struct DbClient {
    conn: Connection,
    target: String,
    state: Cell<TransactionState>,
}

impl DbClient {
    /// Opens the database described by `config`.
    ///
    /// # Errors
    ///
    /// `StoreError::Connection` when the database cannot be opened or
    /// configured. This error is never recovered by the table layer.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let target = config.path.clone();
        let opened = if target == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(&target)
        };
        let conn = opened.map_err(|source| {
            error!(target = %target, error = %source, "cannot connect");
            StoreError::Connection {
                target: target.clone(),
                source,
            }
        })?;

        let bootstrap = conn
            .busy_timeout(config.connect_timeout())
            .and_then(|()| {
                conn.pragma_update(None, "foreign_keys", config.foreign_keys.unwrap_or(true))
            });
        if let Err(source) = bootstrap {
            error!(target = %target, error = %source, "cannot configure connection");
            return Err(StoreError::Connection { target, source });
        }

        info!(target = %target, "connected");
        Ok(DbClient {
            conn,
            target,
            state: Cell::new(TransactionState::Idle),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::connect(&DatabaseConfig::in_memory())
    }

    /// Path (or `:memory:`) this client is connected to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.state.get()
    }

    /// Returns the connection ready for one more statement, opening a
    /// transaction first when none is active.
    pub(crate) fn begin_statement(&self) -> Result<&Connection> {
        match self.state.get() {
            TransactionState::Failed => Err(StoreError::TransactionAborted),
            TransactionState::Active => Ok(&self.conn),
            TransactionState::Idle => {
                self.control(BEGIN).map_err(StoreError::from_driver)?;
                self.state.set(TransactionState::Active);
                Ok(&self.conn)
            }
        }
    }

    /// Runs raw SQL (possibly several statements) without parameters.
    ///
    /// Unlike the query executor this path does not roll back on failure:
    /// the transaction is left `Failed` until the caller rolls back.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.begin_statement()?;
        debug!(target = %self.target, intent = StatementType::from_sql(sql).as_str(), "raw statement");
        conn.execute_batch(sql).map_err(|err| {
            warn!(target = %self.target, error = %err, "raw statement failed, transaction aborted");
            self.state.set(TransactionState::Failed);
            StoreError::from_driver(err)
        })
    }

    /// Commits the open transaction, if any.
    ///
    /// Committing a failed transaction rolls it back and reports
    /// `StoreError::TransactionAborted`.
    pub fn commit(&self) -> Result<()> {
        match self.state.get() {
            TransactionState::Idle => Ok(()),
            TransactionState::Failed => {
                self.rollback()?;
                Err(StoreError::TransactionAborted)
            }
            TransactionState::Active => {
                if let Err(err) = self.control(COMMIT) {
                    error!(target = %self.target, error = %err, "commit failed");
                    self.rollback()?;
                    return Err(StoreError::from_driver(err));
                }
                self.state.set(TransactionState::Idle);
                Ok(())
            }
        }
    }

    /// Rolls back the open transaction. Safe to call when none is open.
    pub fn rollback(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            if let Err(err) = self.control(ROLLBACK) {
                self.state.set(TransactionState::Failed);
                return Err(StoreError::from_driver(err));
            }
        }
        self.state.set(TransactionState::Idle);
        Ok(())
    }

    /// Runs one transaction-control statement.
    fn control(&self, sql: &'static str) -> rusqlite::Result<()> {
        debug!(target = %self.target, intent = StatementType::from_sql(sql).as_str(), sql, "transaction control");
        self.conn.execute_batch(sql)
    }

    /// Closes the connection, discarding any uncommitted work.
    pub fn close(self) -> Result<()> {
        self.rollback()?;
        let target = self.target;
        self.conn
            .close()
            .map_err(|(_conn, err)| StoreError::from_driver(err))?;
        info!(target = %target, "closed connection");
        Ok(())
    }
}
