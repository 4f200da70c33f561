//! Property-based tests for record round trips.
//!
//! These tests verify, for arbitrary persons, that:
//! - an inserted record reads back unchanged by its identifier
//! - a second insert with the same identifier is refused and leaves the row intact
//! - identifiers and values are never spliced into SQL text

use chrono::NaiveDate;
use proptest::prelude::*;
use tabula::core::db::Identifier;
use tabula::{DbClient, Person, PersonField, Persons, Queryable, TableManager};

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_person() -> impl Strategy<Value = Person> {
    (any::<i64>(), "\\PC{1,64}", arb_date()).prop_map(|(id, name, birthday)| Person::new(id, name, birthday))
}

fn persons_db() -> DbClient {
    let client = DbClient::open_in_memory().unwrap();
    assert!(TableManager::new(&client).create_table_for::<Person>());
    client
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_insert_then_select_round_trips(person in arb_person()) {
        let client = persons_db();
        let table = Persons::new(&client).unwrap();

        prop_assert_eq!(table.insert(&person).unwrap(), Some(person.clone()));
        prop_assert_eq!(table.select(&person, PersonField::PersonId).unwrap(), Some(person));
    }

    #[test]
    fn prop_identifier_is_unique(first in arb_person(), second in arb_person()) {
        let client = persons_db();
        let table = Persons::new(&client).unwrap();
        let clash = Person::new(first.person_id, second.first_name, second.birthday);

        table.insert(&first).unwrap();
        prop_assert_eq!(table.insert(&clash).unwrap(), None);
        prop_assert_eq!(table.select(&first, PersonField::PersonId).unwrap(), Some(first));
    }

    #[test]
    fn prop_identifier_quoting_is_reversible(name in "[^\\x00]{1,32}") {
        let quoted = Identifier::new(name.clone()).unwrap().quoted();
        prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));

        let inner = &quoted[1..quoted.len() - 1];
        prop_assert_eq!(inner.replace("\"\"", "\""), name);
    }
}
