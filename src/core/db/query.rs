/// Query Execution Module
///
/// Runs finished, parameterized statements on the shared connection. The
/// executor never commits; on any failure it logs, rolls the connection back
/// and propagates the classified error.
use crate::core::db::builder::Query;
use crate::core::db::connection::DbClient;
use crate::core::{Result, StoreError};
use rusqlite::{Row, Statement, ToSql};
use tracing::{debug, error};

/// Query execution service that operates on a database client
pub struct QueryExecutor<'a> {
    client: &'a DbClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new QueryExecutor for the given client
    pub fn new(client: &'a DbClient) -> Self {
        QueryExecutor { client }
    }

    /// Executes a statement that returns no rows.
    ///
    /// # Returns
    ///
    /// The number of rows changed.
    pub fn execute(&self, query: &Query, params: &[&dyn ToSql]) -> Result<usize> {
        self.run(query, params, |stmt, params| stmt.execute(params))
    }

    /// Executes a statement and maps at most one result row.
    ///
    /// Zero rows yields `None`; rows after the first are not read.
    pub fn fetch_one<T, F>(&self, query: &Query, params: &[&dyn ToSql], mut map: F) -> Result<Option<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run(query, params, |stmt, params| {
            let mut rows = stmt.query(params)?;
            match rows.next()? {
                Some(row) => map(row).map(Some),
                None => Ok(None),
            }
        })
    }

    /// Executes a statement and maps every result row.
    pub fn fetch_all<T, F>(&self, query: &Query, params: &[&dyn ToSql], mut map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.run(query, params, |stmt, params| {
            let mut rows = stmt.query(params)?;
            let mut mapped = Vec::new();
            while let Some(row) = rows.next()? {
                mapped.push(map(row)?);
            }
            Ok(mapped)
        })
    }

    fn run<T, F>(&self, query: &Query, params: &[&dyn ToSql], step: F) -> Result<T>
    where
        F: FnOnce(&mut Statement<'_>, &[&dyn ToSql]) -> rusqlite::Result<T>,
    {
        query.check_arity(params.len())?;

        match self.run_statement(query, params, step) {
            Ok(value) => {
                debug!(
                    intent = query.kind().as_str(),
                    sql = query.sql(),
                    params = ?describe_params(params),
                    "executed statement"
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    intent = query.kind().as_str(),
                    sql = query.sql(),
                    error = %err,
                    "statement failed, rolling back"
                );
                if let Err(rollback_err) = self.client.rollback() {
                    error!(error = %rollback_err, "rollback after failed statement also failed");
                }
                Err(err)
            }
        }
    }

    /// The prepared statement lives only inside this call, so it is
    /// finalized on every exit path before any rollback is issued.
    fn run_statement<T, F>(&self, query: &Query, params: &[&dyn ToSql], step: F) -> Result<T>
    where
        F: FnOnce(&mut Statement<'_>, &[&dyn ToSql]) -> rusqlite::Result<T>,
    {
        let conn = self.client.begin_statement()?;
        let mut stmt = conn.prepare(query.sql()).map_err(StoreError::from_driver)?;
        step(&mut stmt, params).map_err(StoreError::from_driver)
    }
}

/// Renders bound values for log records.
fn describe_params(params: &[&dyn ToSql]) -> Vec<String> {
    params
        .iter()
        .map(|param| match param.to_sql() {
            Ok(output) => format!("{output:?}"),
            Err(err) => format!("<unrenderable: {err}>"),
        })
        .collect()
}

/// Represents different SQL statement types for introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    /// SELECT statement
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// CREATE statement
    Create,
    /// DROP statement
    Drop,
    /// ALTER statement
    Alter,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    /// Other statement types
    Other,
}

impl StatementType {
    /// Determines the statement type from a SQL string
    pub fn from_sql(sql: &str) -> Self {
        let sql_upper = sql.trim().to_uppercase();

        if sql_upper.starts_with("SELECT") {
            StatementType::Select
        } else if sql_upper.starts_with("INSERT") {
            StatementType::Insert
        } else if sql_upper.starts_with("UPDATE") {
            StatementType::Update
        } else if sql_upper.starts_with("DELETE") {
            StatementType::Delete
        } else if sql_upper.starts_with("CREATE") {
            StatementType::Create
        } else if sql_upper.starts_with("DROP") {
            StatementType::Drop
        } else if sql_upper.starts_with("ALTER") {
            StatementType::Alter
        } else if sql_upper.starts_with("BEGIN")
            || sql_upper.starts_with("COMMIT")
            || sql_upper.starts_with("ROLLBACK")
        {
            StatementType::Transaction
        } else {
            StatementType::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementType::Select => "select",
            StatementType::Insert => "insert",
            StatementType::Update => "update",
            StatementType::Delete => "delete",
            StatementType::Create => "create",
            StatementType::Drop => "drop",
            StatementType::Alter => "alter",
            StatementType::Transaction => "transaction",
            StatementType::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::builder::{self, Identifier};
    use crate::core::db::connection::TransactionState;
    use rusqlite::params;

    fn setup(client: &DbClient) {
        client
            .execute_batch(
                "
                CREATE TABLE test (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
                INSERT INTO test (id, name) VALUES (1, 'Alice');
                INSERT INTO test (id, name) VALUES (2, 'Bob');
                INSERT INTO test (id, name) VALUES (3, 'Bob');
            ",
            )
            .unwrap();
        client.commit().unwrap();
    }

    fn by_name() -> Query {
        builder::select_where(&Identifier::new("test").unwrap(), &Identifier::new("name").unwrap())
    }

    #[test]
    fn test_fetch_one_and_all() {
        let client = DbClient::open_in_memory().unwrap();
        setup(&client);
        let executor = QueryExecutor::new(&client);

        let first = executor
            .fetch_one(&by_name(), params!["Alice"], |row| row.get::<_, i64>("id"))
            .unwrap();
        assert_eq!(first, Some(1));

        let none = executor
            .fetch_one(&by_name(), params!["Nobody"], |row| row.get::<_, i64>("id"))
            .unwrap();
        assert_eq!(none, None);

        let bobs = executor
            .fetch_all(&by_name(), params!["Bob"], |row| row.get::<_, i64>("id"))
            .unwrap();
        assert_eq!(bobs, vec![2, 3]);
    }

    #[test]
    fn test_failure_rolls_back_and_propagates() {
        let client = DbClient::open_in_memory().unwrap();
        setup(&client);
        let executor = QueryExecutor::new(&client);

        let insert = builder::insert_returning(
            &Identifier::new("test").unwrap(),
            &[Identifier::new("id").unwrap()],
        );
        let err = executor
            .fetch_one(&insert, params![4], |row| row.get::<_, i64>(0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)), "got {err:?}");
        assert_eq!(client.transaction_state(), TransactionState::Idle);

        // The connection is usable again after the rollback.
        let count = executor
            .fetch_all(&by_name(), params!["Bob"], |row| row.get::<_, i64>("id"))
            .unwrap();
        assert_eq!(count.len(), 2);
    }

    #[test]
    fn test_arity_mismatch_never_reaches_store() {
        let client = DbClient::open_in_memory().unwrap();
        setup(&client);
        let executor = QueryExecutor::new(&client);

        let err = executor.execute(&by_name(), params![]).unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
        assert_eq!(client.transaction_state(), TransactionState::Idle);
    }

    #[test]
    fn test_statement_type_classification() {
        assert_eq!(StatementType::from_sql("SELECT * FROM users"), StatementType::Select);
        assert_eq!(StatementType::from_sql("INSERT INTO users VALUES (1, 'test')"), StatementType::Insert);
        assert_eq!(StatementType::from_sql("UPDATE users SET name = 'new'"), StatementType::Update);
        assert_eq!(StatementType::from_sql("DELETE FROM users WHERE id = 1"), StatementType::Delete);
        assert_eq!(StatementType::from_sql("CREATE TABLE test (id INTEGER)"), StatementType::Create);
        assert_eq!(StatementType::from_sql("DROP TABLE test"), StatementType::Drop);
        assert_eq!(StatementType::from_sql("ALTER TABLE test RENAME TO t2"), StatementType::Alter);
        assert_eq!(StatementType::from_sql("BEGIN"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("ROLLBACK"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("PRAGMA foreign_keys = ON"), StatementType::Other);
    }
}
