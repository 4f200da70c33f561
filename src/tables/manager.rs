use crate::core::db::{builder, DbClient, Identifier, Query, QueryExecutor};
use crate::core::Result;
use crate::model::TableShape;
use rusqlite::params;
use tracing::{error, info};

/// Creates and drops whole tables.
///
/// Failures are never propagated: they are rolled back, logged, and reported
/// as `false`.
#[derive(Debug)]
pub struct TableManager<'c> {
    client: &'c DbClient,
}

impl<'c> TableManager<'c> {
    pub fn new(client: &'c DbClient) -> Self {
        TableManager { client }
    }

    /// Raw executor on the managed connection, for ad-hoc checks.
    pub fn executor(&self) -> QueryExecutor<'c> {
        QueryExecutor::new(self.client)
    }

    /// Runs caller-supplied DDL that creates `table_name`.
    pub fn create_table(&self, table_name: &str, ddl: &str) -> bool {
        let outcome = self.client.execute_batch(ddl).and_then(|()| self.client.commit());
        self.finish("create table", table_name, outcome)
    }

    /// Runs caller-supplied DDL that deletes `table_name`.
    pub fn delete_table(&self, table_name: &str, ddl: &str) -> bool {
        let outcome = self.client.execute_batch(ddl).and_then(|()| self.client.commit());
        self.finish("delete table", table_name, outcome)
    }

    /// Creates the table declared by `S`.
    pub fn create_table_for<S: TableShape>(&self) -> bool {
        let outcome = Identifier::new(S::TABLE)
            .and_then(|table| builder::create_table(&table, S::COLUMNS))
            .and_then(|query| self.apply(&query));
        self.finish("create table", S::TABLE, outcome)
    }

    /// Drops the table declared by `S` if it exists.
    pub fn drop_table_for<S: TableShape>(&self) -> bool {
        let outcome = Identifier::new(S::TABLE)
            .map(|table| builder::drop_table_if_exists(&table))
            .and_then(|query| self.apply(&query));
        self.finish("delete table", S::TABLE, outcome)
    }

    fn apply(&self, query: &Query) -> Result<()> {
        self.executor().execute(query, params![])?;
        self.client.commit()
    }

    fn finish(&self, action: &str, table_name: &str, outcome: Result<()>) -> bool {
        match outcome {
            Ok(()) => {
                info!(table = table_name, "{action}");
                true
            }
            Err(err) => {
                if let Err(rollback_err) = self.client.rollback() {
                    error!(table = table_name, error = %rollback_err, "rollback failed");
                }
                error!(table = table_name, error = %err, "cannot {action}");
                false
            }
        }
    }
}
