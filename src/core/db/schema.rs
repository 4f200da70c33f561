/// Schema Introspection Module
///
/// Column metadata as reported by the store for one table.
use rusqlite::Row;
use serde::Serialize;

/// Represents a table column with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Table the column belongs to
    pub table_name: String,
    /// Column name
    pub column_name: String,
    /// Declared type, lower-cased (e.g. "integer", "varchar(128)", "text")
    pub data_type: String,
    /// 1-based position within the table
    pub ordinal_position: i64,
    /// Whether the column allows NULL values
    pub is_nullable: bool,
    /// Default value expression (if any)
    pub column_default: Option<String>,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
}

impl ColumnInfo {
    /// Creates a ColumnInfo from a `pragma_table_info` result row extended
    /// with the table's primary-key column count (see `builder::table_info`).
    pub(crate) fn from_pragma_row(table_name: &str, row: &Row<'_>) -> rusqlite::Result<Self> {
        let cid: i64 = row.get(0)?;
        let data_type: String = row.get(2)?;
        let notnull: bool = row.get(3)?;
        let pk: i64 = row.get(5)?;
        let pk_columns: i64 = row.get(6)?;
        // Only a sole `INTEGER PRIMARY KEY` aliases the rowid and rejects NULL;
        // any other primary key column still accepts it unless NOT NULL.
        let rowid_alias = pk == 1 && pk_columns == 1 && data_type.eq_ignore_ascii_case("integer");
        Ok(ColumnInfo {
            table_name: table_name.to_string(),
            column_name: row.get(1)?,
            data_type: data_type.to_lowercase(),
            ordinal_position: cid + 1,
            is_nullable: !notnull && !rowid_alias,
            column_default: row.get(4)?,
            is_primary_key: pk > 0,
        })
    }
}
