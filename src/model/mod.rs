//! Record types and the traits that tie them to tables.
//!
//! A record is an immutable value with a fixed, ordered field set. Its field
//! selector enum names exactly those fields and is the only way table
//! operations refer to columns.

pub mod person;

pub use person::{BetterPerson, BetterPersonField, Person, PersonField};

use crate::core::db::Identifier;
use crate::core::Result;
use rusqlite::{Row, ToSql};
use std::fmt::Debug;

/// Closed enumeration of a record's fields, in declaration order.
pub trait FieldSelector: Copy + Eq + Debug + 'static {
    /// Every field, in the order the record declares them.
    const ALL: &'static [Self];

    /// Column name backing this field.
    fn column(self) -> &'static str;

    fn identifier(self) -> Result<Identifier> {
        Identifier::new(self.column())
    }
}

/// One column of a table's declared structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        ColumnDef {
            name,
            sql_type,
            primary_key: false,
            not_null: false,
        }
    }

    pub const fn primary_key(self) -> Self {
        ColumnDef {
            primary_key: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        ColumnDef {
            not_null: true,
            ..self
        }
    }
}

/// Declared structure of a table.
pub trait TableShape {
    const TABLE: &'static str;
    const COLUMNS: &'static [ColumnDef];
}

/// A record mapped onto rows of its table.
pub trait Record: TableShape + Clone + Debug + Sized {
    type Field: FieldSelector;
    type Id: ToSql;

    /// The primary identifier field.
    const ID: Self::Field;

    /// Bindable value of one field.
    fn value(&self, field: Self::Field) -> &dyn ToSql;

    /// Maps a full row (`SELECT *` / `RETURNING *`) back into a record.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Bindable values of every field, in declaration order.
    fn values(&self) -> Vec<&dyn ToSql> {
        Self::Field::ALL.iter().map(|field| self.value(*field)).collect()
    }

    /// Names of the fields whose values differ between `self` and `other`.
    fn compare(&self, other: &Self) -> Vec<&'static str>;
}
