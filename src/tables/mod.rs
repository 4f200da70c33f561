//! Table handles.
//!
//! Two independent capability sets sit on top of one shared `DbClient`:
//! - [`Queryable`]: typed row CRUD for a [`Record`] type ([`RecordTable`]),
//! - [`SchemaMutable`]: structural changes to a table ([`SchemaTable`]).
//!
//! Every operation runs under the transaction-failure recovery wrapper and
//! commits on success. Recovered failures surface as empty outcomes
//! (`None`, `false`, `()`), never as errors; only unclassified store errors
//! and malformed requests reach the caller.

mod manager;
mod record_table;
mod schema_table;

pub use manager::TableManager;
pub use record_table::{Persons, RecordTable};
pub use schema_table::{SchemaTable, TableIdentity};

use crate::core::db::ColumnInfo;
use crate::core::Result;
use crate::model::Record;
use rusqlite::ToSql;

/// Rows removed by a delete.
///
/// A single match is returned bare rather than as a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted<R> {
    One(R),
    Many(Vec<R>),
}

impl<R> Deleted<R> {
    pub fn len(&self) -> usize {
        match self {
            Deleted::One(_) => 1,
            Deleted::Many(rows) => rows.len(),
        }
    }

    pub fn into_vec(self) -> Vec<R> {
        match self {
            Deleted::One(row) => vec![row],
            Deleted::Many(rows) => rows,
        }
    }

    /// Wraps deleted rows; `None` when nothing matched.
    pub(crate) fn from_rows(mut rows: Vec<R>) -> Option<Self> {
        match rows.len() {
            0 => None,
            1 => rows.pop().map(Deleted::One),
            _ => Some(Deleted::Many(rows)),
        }
    }
}

/// Row-level CRUD over records of type `R`.
pub trait Queryable<R: Record> {
    /// The row whose `by` column equals the template's value for that field.
    fn select(&self, template: &R, by: R::Field) -> Result<Option<R>>;

    /// Inserts every field of `record`; `None` if its identifier is taken.
    fn insert(&self, record: &R) -> Result<Option<R>>;

    /// Sets `fields` to `values` (parallel lists) on the row identified by
    /// `id` and returns the updated row; `None` if no row has that id.
    fn update(&self, id: &R::Id, fields: &[R::Field], values: &[&dyn ToSql]) -> Result<Option<R>>;

    /// Deletes every row matching the template on `by`.
    fn delete(&self, template: &R, by: R::Field) -> Result<Option<Deleted<R>>>;
}

/// Structural operations on one table.
pub trait SchemaMutable {
    /// The table's current name.
    fn name(&self) -> &str;

    fn table_exists(&self) -> Result<bool>;

    /// Name as recorded by the store's catalogue, if the table exists.
    fn stored_name(&self) -> Result<Option<String>>;

    fn rename(&mut self, new_name: &str) -> Result<()>;

    fn column_exists(&self, name: &str) -> Result<bool>;

    fn add_column(&self, name: &str, column_type: &str) -> Result<()>;

    fn rename_column(&self, old_name: &str, new_name: &str) -> Result<()>;

    fn get_column(&self, name: &str) -> Result<Option<ColumnInfo>>;

    fn columns(&self) -> Result<Vec<ColumnInfo>>;

    fn drop_column(&self, name: &str) -> Result<()>;

    fn drop_table(&self) -> Result<()>;
}
