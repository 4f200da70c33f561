//! Table creation and teardown against file-backed databases.

mod common;

use common::{date, smoke};
use std::io::Write;
use tabula::config::{load_config, DatabaseConfig};
use tabula::{BetterPerson, DbClient, Person, PersonField, Persons, Queryable, SchemaMutable, SchemaTable, TableManager};
use tempfile::{NamedTempFile, TempDir};

const CREATE_PERSONS: &str = "
    CREATE TABLE persons (
        person_id INTEGER PRIMARY KEY,
        first_name VARCHAR(128) NOT NULL,
        birthday DATE NOT NULL
    );
";

#[test]
fn test_raw_ddl_creates_usable_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw.sqlite");
    let client = DbClient::connect(&DatabaseConfig::at(path.to_string_lossy())).unwrap();
    let manager = TableManager::new(&client);

    assert!(manager.create_table("persons", CREATE_PERSONS));
    assert!(!manager.create_table("persons", CREATE_PERSONS), "table already exists");

    let table = Persons::new(&client).unwrap();
    assert_eq!(table.insert(&smoke()).unwrap(), Some(smoke()));

    assert!(manager.delete_table("persons", "DROP TABLE persons;"));
    assert!(!SchemaTable::new(&client, "persons").unwrap().table_exists().unwrap());
}

#[test]
fn test_committed_rows_survive_reconnect() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig::at(dir.path().join("persist.sqlite").to_string_lossy());

    {
        let client = DbClient::connect(&config).unwrap();
        assert!(TableManager::new(&client).create_table_for::<Person>());
        assert!(TableManager::new(&client).create_table_for::<BetterPerson>());
        Persons::new(&client).unwrap().insert(&smoke()).unwrap();
        client.close().unwrap();
    }

    let client = DbClient::connect(&config).unwrap();
    let table = Persons::new(&client).unwrap();
    assert_eq!(table.select(&smoke(), PersonField::PersonId).unwrap(), Some(smoke()));

    let better = SchemaTable::for_shape::<BetterPerson>(&client).unwrap();
    assert_eq!(better.columns().unwrap().len(), 7);

    let manager = TableManager::new(&client);
    assert!(manager.drop_table_for::<Person>());
    assert!(manager.drop_table_for::<BetterPerson>());
}

#[test]
fn test_connect_from_config_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("configured.sqlite");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[database]").unwrap();
    writeln!(file, "path = {:?}", db_path.to_string_lossy()).unwrap();
    writeln!(file, "connect_timeout_secs = 1").unwrap();

    let config = load_config(file.path()).unwrap();
    let client = DbClient::connect(&config.database).unwrap();
    assert_eq!(client.target(), db_path.to_string_lossy());

    assert!(TableManager::new(&client).create_table_for::<Person>());
    let late = Person::new(9, "Kitana", date(1, 1, 1));
    assert_eq!(Persons::new(&client).unwrap().insert(&late).unwrap(), Some(late));
}

#[test]
fn test_connect_to_unreachable_path_fails() {
    let config = DatabaseConfig::at("/nonexistent/dir/tabula.sqlite");
    let err = DbClient::connect(&config).unwrap_err();
    assert_eq!(err.error_code(), "CONNECTION_ERROR");
}
