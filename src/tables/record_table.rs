use super::{Deleted, Queryable};
use crate::core::db::{builder, on_transaction_failed, recover_local, DbClient, Identifier, QueryExecutor};
use crate::core::{Result, StoreError};
use crate::model::{FieldSelector, Person, Record};
use rusqlite::ToSql;
use std::marker::PhantomData;
use tracing::info;

/// CRUD handle for the table holding records of type `R`.
#[derive(Debug)]
pub struct RecordTable<'c, R: Record> {
    client: &'c DbClient,
    table: Identifier,
    _record: PhantomData<R>,
}

pub type Persons<'c> = RecordTable<'c, Person>;

impl<'c, R: Record> RecordTable<'c, R> {
    pub fn new(client: &'c DbClient) -> Result<Self> {
        Ok(RecordTable {
            client,
            table: Identifier::new(R::TABLE)?,
            _record: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        self.table.as_str()
    }

    fn executor(&self) -> QueryExecutor<'c> {
        QueryExecutor::new(self.client)
    }
}

fn column_identifiers<F: FieldSelector>(fields: &[F]) -> Result<Vec<Identifier>> {
    fields.iter().map(|field| field.identifier()).collect()
}

impl<R: Record> Queryable<R> for RecordTable<'_, R> {
    fn select(&self, template: &R, by: R::Field) -> Result<Option<R>> {
        on_transaction_failed(self.client, "select", || {
            let query = builder::select_where(&self.table, &by.identifier()?);
            let found = self
                .executor()
                .fetch_one(&query, &[template.value(by)], R::from_row)?;
            self.client.commit()?;

            info!(table = %self.table, by = by.column(), found = found.is_some(), "select");
            Ok(found)
        })
    }

    fn insert(&self, record: &R) -> Result<Option<R>> {
        on_transaction_failed(self.client, "insert", || {
            let columns = column_identifiers(<R::Field as FieldSelector>::ALL)?;
            let query = builder::insert_returning(&self.table, &columns);
            let outcome = self.executor().fetch_one(&query, &record.values(), R::from_row);

            let inserted = recover_local(self.client, "insert", outcome, StoreError::is_unique_violation)?;
            self.client.commit()?;

            info!(table = %self.table, record = ?record, inserted = inserted.is_some(), "insert");
            Ok(inserted)
        })
    }

    fn update(&self, id: &R::Id, fields: &[R::Field], values: &[&dyn ToSql]) -> Result<Option<R>> {
        if fields.is_empty() {
            return Err(StoreError::Query("update needs at least one field".to_string()));
        }
        if fields.len() != values.len() {
            return Err(StoreError::Query(format!(
                "update got {} fields but {} values",
                fields.len(),
                values.len()
            )));
        }

        on_transaction_failed(self.client, "update", || {
            let columns = column_identifiers(fields)?;
            let query = builder::update_returning(&self.table, &columns, &R::ID.identifier()?);

            let mut params: Vec<&dyn ToSql> = values.to_vec();
            params.push(id);
            let updated = self.executor().fetch_one(&query, &params, R::from_row)?;
            self.client.commit()?;

            let changed: Vec<_> = fields.iter().map(|field| field.column()).collect();
            info!(table = %self.table, fields = ?changed, updated = updated.is_some(), "update");
            Ok(updated)
        })
    }

    fn delete(&self, template: &R, by: R::Field) -> Result<Option<Deleted<R>>> {
        on_transaction_failed(self.client, "delete", || {
            let query = builder::delete_returning(&self.table, &by.identifier()?);
            let rows = self
                .executor()
                .fetch_all(&query, &[template.value(by)], R::from_row)?;
            self.client.commit()?;

            info!(table = %self.table, by = by.column(), deleted = rows.len(), "delete");
            Ok(Deleted::from_rows(rows))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersonField;
    use crate::tables::TableManager;
    use chrono::NaiveDate;

    fn persons(client: &DbClient) -> Persons<'_> {
        assert!(TableManager::new(client).create_table_for::<Person>());
        Persons::new(client).unwrap()
    }

    #[test]
    fn test_update_rejects_mismatched_lists() {
        let client = DbClient::open_in_memory().unwrap();
        let table = persons(&client);

        let err = table
            .update(&1, &[PersonField::FirstName, PersonField::Birthday], &[&"only one"])
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));

        let err = table.update(&1, &[], &[]).unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn test_select_by_non_identifier_field() {
        let client = DbClient::open_in_memory().unwrap();
        let table = persons(&client);
        let birthday = NaiveDate::from_ymd_opt(1993, 2, 1).unwrap();
        let person = Person::new(3, "Jax", birthday);
        table.insert(&person).unwrap();

        let template = Person::new(0, "Jax", birthday);
        assert_eq!(table.select(&template, PersonField::FirstName).unwrap(), Some(person.clone()));
        assert_eq!(table.select(&template, PersonField::Birthday).unwrap(), Some(person));
        assert_eq!(table.name(), "persons");
    }
}
