/// Identifier-Safe Query Builder
///
/// SQL text is assembled from three kinds of pieces only:
/// - static fragments (`&'static str`, never runtime data),
/// - identifiers, always double-quoted with embedded quotes doubled,
/// - positional `?N` placeholders whose values travel separately.
///
/// Column types are the one exception to quoting: SQLite accepts any word as
/// a type, so types are validated against a known catalogue instead.
use crate::core::db::query::StatementType;
use crate::core::{Result, StoreError};
use crate::model::ColumnDef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `NAME` or `NAME(n)` or `NAME(p, s)`; NAME may contain inner spaces
/// (`DOUBLE PRECISION`).
static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+(?: [A-Za-z]+)*)\s*(\(\s*\d+\s*(?:,\s*\d+\s*)?\))?$").unwrap()
});

const KNOWN_TYPES: &[&str] = &[
    "INTEGER",
    "INT",
    "BIGINT",
    "SMALLINT",
    "TINYINT",
    "MEDIUMINT",
    "TEXT",
    "VARCHAR",
    "CHAR",
    "CHARACTER",
    "CHARACTER VARYING",
    "NCHAR",
    "NVARCHAR",
    "CLOB",
    "REAL",
    "DOUBLE",
    "DOUBLE PRECISION",
    "FLOAT",
    "NUMERIC",
    "DECIMAL",
    "BOOLEAN",
    "BOOL",
    "DATE",
    "DATETIME",
    "TIMESTAMP",
    "TIME",
    "BLOB",
];

/// A validated table or column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validates `name` as an identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Structural` for an empty name or one containing
    /// a NUL byte.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::Structural(
                "zero-length delimited identifier".to_string(),
            ));
        }
        if name.contains('\0') {
            return Err(StoreError::Structural(format!(
                "identifier {name:?} contains a NUL byte"
            )));
        }
        Ok(Identifier(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as it appears in SQL text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column type name checked against the known type catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType(String);

impl ColumnType {
    /// # Errors
    ///
    /// Returns `StoreError::Structural` when the type is not in the catalogue
    /// or its size modifier is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let unknown = || StoreError::Structural(format!("type \"{raw}\" does not exist"));

        let captures = TYPE_PATTERN.captures(trimmed).ok_or_else(unknown)?;
        let base = captures[1].to_ascii_uppercase();
        if !KNOWN_TYPES.contains(&base.as_str()) {
            return Err(unknown());
        }
        Ok(ColumnType(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A finished statement: SQL text plus the number of values it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    sql: String,
    placeholders: usize,
    kind: StatementType,
}

impl Query {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Statement intent, used in log records.
    pub fn kind(&self) -> StatementType {
        self.kind
    }

    pub(crate) fn check_arity(&self, supplied: usize) -> Result<()> {
        if supplied != self.placeholders {
            return Err(StoreError::Query(format!(
                "statement expects {} bound values, got {supplied}",
                self.placeholders
            )));
        }
        Ok(())
    }
}

/// Incremental statement assembly.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    sql: String,
    placeholders: usize,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends literal SQL. Only static text is accepted.
    pub fn sql(mut self, fragment: &'static str) -> Self {
        self.sql.push_str(fragment);
        self
    }

    pub fn identifier(mut self, identifier: &Identifier) -> Self {
        self.sql.push_str(&identifier.quoted());
        self
    }

    /// Comma-separated identifier list.
    pub fn identifiers(mut self, identifiers: &[Identifier]) -> Self {
        let joined = identifiers
            .iter()
            .map(Identifier::quoted)
            .collect::<Vec<_>>()
            .join(", ");
        self.sql.push_str(&joined);
        self
    }

    pub fn column_type(mut self, column_type: &ColumnType) -> Self {
        self.sql.push_str(column_type.as_str());
        self
    }

    pub fn placeholder(mut self) -> Self {
        self.placeholders += 1;
        self.sql.push_str(&format!("?{}", self.placeholders));
        self
    }

    /// Comma-separated list of `count` placeholders.
    pub fn placeholders(mut self, count: usize) -> Self {
        for i in 0..count {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self = self.placeholder();
        }
        self
    }

    pub fn build(self) -> Query {
        let kind = StatementType::from_sql(&self.sql);
        Query {
            sql: self.sql,
            placeholders: self.placeholders,
            kind,
        }
    }
}

/// `SELECT * FROM t WHERE c = ?1`
pub fn select_where(table: &Identifier, column: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("SELECT * FROM ")
        .identifier(table)
        .sql(" WHERE ")
        .identifier(column)
        .sql(" = ")
        .placeholder()
        .build()
}

/// `INSERT INTO t (c1, ..) VALUES (?1, ..) RETURNING *`
pub fn insert_returning(table: &Identifier, columns: &[Identifier]) -> Query {
    QueryBuilder::new()
        .sql("INSERT INTO ")
        .identifier(table)
        .sql(" (")
        .identifiers(columns)
        .sql(") VALUES (")
        .placeholders(columns.len())
        .sql(") RETURNING *")
        .build()
}

/// Updates `columns` on the row whose `id_column` matches the last bound
/// value. Several columns use the row-value form `SET (a, b) = (?1, ?2)`.
pub fn update_returning(table: &Identifier, columns: &[Identifier], id_column: &Identifier) -> Query {
    let builder = QueryBuilder::new()
        .sql("UPDATE ")
        .identifier(table)
        .sql(" SET ");
    let builder = if columns.len() == 1 {
        builder.identifiers(columns).sql(" = ").placeholder()
    } else {
        builder
            .sql("(")
            .identifiers(columns)
            .sql(") = (")
            .placeholders(columns.len())
            .sql(")")
    };
    builder
        .sql(" WHERE ")
        .identifier(id_column)
        .sql(" = ")
        .placeholder()
        .sql(" RETURNING *")
        .build()
}

/// `DELETE FROM t WHERE c = ?1 RETURNING *`
pub fn delete_returning(table: &Identifier, column: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("DELETE FROM ")
        .identifier(table)
        .sql(" WHERE ")
        .identifier(column)
        .sql(" = ")
        .placeholder()
        .sql(" RETURNING *")
        .build()
}

pub fn rename_table(table: &Identifier, new_name: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("ALTER TABLE ")
        .identifier(table)
        .sql(" RENAME TO ")
        .identifier(new_name)
        .build()
}

pub fn add_column(table: &Identifier, column: &Identifier, column_type: &ColumnType) -> Query {
    QueryBuilder::new()
        .sql("ALTER TABLE ")
        .identifier(table)
        .sql(" ADD COLUMN ")
        .identifier(column)
        .sql(" ")
        .column_type(column_type)
        .build()
}

pub fn rename_column(table: &Identifier, column: &Identifier, new_name: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("ALTER TABLE ")
        .identifier(table)
        .sql(" RENAME COLUMN ")
        .identifier(column)
        .sql(" TO ")
        .identifier(new_name)
        .build()
}

pub fn drop_column(table: &Identifier, column: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("ALTER TABLE ")
        .identifier(table)
        .sql(" DROP COLUMN ")
        .identifier(column)
        .build()
}

pub fn drop_table(table: &Identifier) -> Query {
    QueryBuilder::new().sql("DROP TABLE ").identifier(table).build()
}

pub fn drop_table_if_exists(table: &Identifier) -> Query {
    QueryBuilder::new()
        .sql("DROP TABLE IF EXISTS ")
        .identifier(table)
        .build()
}

/// `CREATE TABLE t (c <type> [PRIMARY KEY] [NOT NULL], ..)`
pub fn create_table(table: &Identifier, columns: &[ColumnDef]) -> Result<Query> {
    if columns.is_empty() {
        return Err(StoreError::Query(format!(
            "table {table} must declare at least one column"
        )));
    }

    let mut builder = QueryBuilder::new()
        .sql("CREATE TABLE ")
        .identifier(table)
        .sql(" (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder = builder.sql(", ");
        }
        builder = builder
            .identifier(&Identifier::new(column.name)?)
            .sql(" ")
            .column_type(&ColumnType::parse(column.sql_type)?);
        if column.primary_key {
            builder = builder.sql(" PRIMARY KEY");
        }
        if column.not_null {
            builder = builder.sql(" NOT NULL");
        }
    }
    Ok(builder.sql(")").build())
}

/// Looks a table up by name in the catalogue.
pub fn table_name_lookup() -> Query {
    QueryBuilder::new()
        .sql("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ")
        .placeholder()
        .build()
}

/// Column metadata rows for table `?1`, optionally narrowed to column `?2`.
///
/// Each row carries a trailing `pk_columns`: how many columns form the
/// table's primary key.
pub fn table_info(single_column: bool) -> Query {
    if single_column {
        QueryBuilder::new()
            .sql("SELECT * FROM (SELECT *, sum(pk > 0) OVER () AS pk_columns FROM pragma_table_info(")
            .placeholder()
            .sql(")) WHERE name = ")
            .placeholder()
            .build()
    } else {
        QueryBuilder::new()
            .sql("SELECT *, sum(pk > 0) OVER () AS pk_columns FROM pragma_table_info(")
            .placeholder()
            .sql(") ORDER BY cid")
            .build()
    }
}
