//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use tabula::{BetterPerson, DbClient, Person, TableManager};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// In-memory client with an empty `persons` table.
pub fn persons_db() -> DbClient {
    let client = DbClient::open_in_memory().unwrap();
    assert!(TableManager::new(&client).create_table_for::<Person>());
    client
}

/// In-memory client with an empty `better_persons` table.
pub fn better_persons_db() -> DbClient {
    let client = DbClient::open_in_memory().unwrap();
    assert!(TableManager::new(&client).create_table_for::<BetterPerson>());
    client
}

pub fn smoke() -> Person {
    Person::new(1, "Smoke", date(1000, 5, 2))
}

pub fn roster() -> Vec<Person> {
    vec![
        Person::new(1, "Smoke", date(1000, 5, 2)),
        Person::new(2, "Shao Kahn", date(1998, 11, 5)),
        Person::new(3, "Kung Lao", date(999, 12, 12)),
        Person::new(4, "Raiden", date(1992, 10, 8)),
        Person::new(5, "Jax", date(1993, 2, 1)),
    ]
}
