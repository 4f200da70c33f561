/// Database Module
///
/// The data-access plumbing underneath the table handles.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): the live connection and its transaction state
/// - **Query Building** (`builder.rs`): identifier-safe SQL assembly and statement templates
/// - **Query Execution** (`query.rs`): runs statements, rolls back on failure
/// - **Recovery** (`recovery.rs`): absorbs the failure kinds table operations expect
/// - **Schema Introspection** (`schema.rs`): column metadata
///
/// ## Error Handling
///
/// All database operations use the standardized `StoreError` type for consistent error propagation.
pub mod builder;
pub mod connection;
pub mod query;
pub mod recovery;
pub mod schema;

pub use builder::{ColumnType, Identifier, Query, QueryBuilder};
pub use connection::{DbClient, TransactionState};
pub use query::{QueryExecutor, StatementType};
pub use recovery::{on_transaction_failed, recover_local};
pub use schema::ColumnInfo;
