use super::SchemaMutable;
use crate::core::db::{
    builder, on_transaction_failed, recover_local, ColumnInfo, ColumnType, DbClient, Identifier, Query,
    QueryExecutor,
};
use crate::core::{Result, StoreError};
use crate::model::TableShape;
use rusqlite::params;
use tracing::info;

/// The name a table handle currently refers to.
///
/// The name changes only through [`TableIdentity::transition`], which the
/// schema table calls once the store has confirmed a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity {
    name: Identifier,
}

impl TableIdentity {
    pub fn named(name: Identifier) -> Self {
        TableIdentity { name }
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    /// Moves to `to`, returning the previous name.
    fn transition(&mut self, to: Identifier) -> Identifier {
        let previous = std::mem::replace(&mut self.name, to);
        info!(from = %previous, to = %self.name, "table identity renamed");
        previous
    }
}

/// DDL handle for one table.
#[derive(Debug)]
pub struct SchemaTable<'c> {
    client: &'c DbClient,
    identity: TableIdentity,
}

impl<'c> SchemaTable<'c> {
    pub fn new(client: &'c DbClient, name: &str) -> Result<Self> {
        Ok(SchemaTable {
            client,
            identity: TableIdentity::named(Identifier::new(name)?),
        })
    }

    /// Handle for the table declared by `S`.
    pub fn for_shape<S: TableShape>(client: &'c DbClient) -> Result<Self> {
        Self::new(client, S::TABLE)
    }

    pub fn identity(&self) -> &TableIdentity {
        &self.identity
    }

    fn executor(&self) -> QueryExecutor<'c> {
        QueryExecutor::new(self.client)
    }

    fn table(&self) -> &Identifier {
        self.identity.name()
    }

    /// Runs one DDL statement and commits it.
    fn apply(&self, query: &Query) -> Result<()> {
        self.executor().execute(query, params![])?;
        self.client.commit()
    }
}

impl SchemaMutable for SchemaTable<'_> {
    fn name(&self) -> &str {
        self.table().as_str()
    }

    fn table_exists(&self) -> Result<bool> {
        on_transaction_failed(self.client, "table_exists", || {
            Ok(self.stored_name()?.is_some())
        })
    }

    fn stored_name(&self) -> Result<Option<String>> {
        on_transaction_failed(self.client, "stored_name", || {
            let found = self.executor().fetch_one(
                &builder::table_name_lookup(),
                params![self.name()],
                |row| row.get::<_, String>(0),
            )?;
            self.client.commit()?;
            Ok(found)
        })
    }

    fn rename(&mut self, new_name: &str) -> Result<()> {
        let client = self.client;
        on_transaction_failed(client, "rename", || {
            let outcome = Identifier::new(new_name).and_then(|to| {
                self.apply(&builder::rename_table(self.table(), &to))?;
                Ok(Some(to))
            });

            if let Some(to) = recover_local(client, "rename", outcome, StoreError::is_structural)? {
                info!(table = %self.table(), to = %to, "rename table");
                self.identity.transition(to);
            }
            Ok(())
        })
    }

    fn column_exists(&self, name: &str) -> Result<bool> {
        on_transaction_failed(self.client, "column_exists", || {
            let found = self.executor().fetch_one(
                &builder::table_info(true),
                params![self.name(), name],
                |row| row.get::<_, String>(1),
            )?;
            self.client.commit()?;
            Ok(found.is_some())
        })
    }

    fn add_column(&self, name: &str, column_type: &str) -> Result<()> {
        on_transaction_failed(self.client, "add_column", || {
            let outcome = Identifier::new(name).and_then(|column| {
                let column_type = ColumnType::parse(column_type)?;
                self.apply(&builder::add_column(self.table(), &column, &column_type))?;
                info!(table = %self.table(), column = name, column_type = column_type.as_str(), "add column");
                Ok(())
            });
            recover_local(self.client, "add_column", outcome, StoreError::is_structural)
        })
    }

    fn rename_column(&self, old_name: &str, new_name: &str) -> Result<()> {
        on_transaction_failed(self.client, "rename_column", || {
            let outcome = Identifier::new(old_name)
                .and_then(|old| Ok((old, Identifier::new(new_name)?)))
                .and_then(|(old, new)| {
                    self.apply(&builder::rename_column(self.table(), &old, &new))?;
                    info!(table = %self.table(), from = old_name, to = new_name, "rename column");
                    Ok(())
                });
            recover_local(self.client, "rename_column", outcome, StoreError::is_structural)
        })
    }

    fn get_column(&self, name: &str) -> Result<Option<ColumnInfo>> {
        on_transaction_failed(self.client, "get_column", || {
            let table = self.name();
            let found = self.executor().fetch_one(
                &builder::table_info(true),
                params![table, name],
                |row| ColumnInfo::from_pragma_row(table, row),
            )?;
            self.client.commit()?;
            Ok(found)
        })
    }

    fn columns(&self) -> Result<Vec<ColumnInfo>> {
        on_transaction_failed(self.client, "columns", || {
            let table = self.name();
            let columns = self.executor().fetch_all(
                &builder::table_info(false),
                params![table],
                |row| ColumnInfo::from_pragma_row(table, row),
            )?;
            self.client.commit()?;
            Ok(columns)
        })
    }

    fn drop_column(&self, name: &str) -> Result<()> {
        on_transaction_failed(self.client, "drop_column", || {
            let outcome = Identifier::new(name).and_then(|column| {
                self.apply(&builder::drop_column(self.table(), &column))?;
                info!(table = %self.table(), column = name, "drop column");
                Ok(())
            });
            recover_local(self.client, "drop_column", outcome, StoreError::is_structural)
        })
    }

    fn drop_table(&self) -> Result<()> {
        on_transaction_failed(self.client, "drop_table", || {
            let outcome = self.apply(&builder::drop_table(self.table()));
            if outcome.is_ok() {
                info!(table = %self.table(), "drop table");
            }
            recover_local(self.client, "drop_table", outcome, StoreError::is_structural)
        })
    }
}
