// Core infrastructure modules
pub mod config;
pub mod core;
pub mod logging;

// Record types and table handles
pub mod model;
pub mod tables;

pub use crate::core::{Result, StoreError};
pub use crate::core::db::{ColumnInfo, DbClient, TransactionState};
pub use crate::model::{BetterPerson, BetterPersonField, Person, PersonField};
pub use crate::tables::{Deleted, Persons, Queryable, RecordTable, SchemaMutable, SchemaTable, TableManager};
