use super::{ColumnDef, FieldSelector, Record, TableShape};
use chrono::NaiveDate;
use rusqlite::{Row, ToSql};

/// A row of the `persons` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub person_id: i64,
    pub first_name: String,
    pub birthday: NaiveDate,
}

impl Person {
    pub fn new(person_id: i64, first_name: impl Into<String>, birthday: NaiveDate) -> Self {
        Person {
            person_id,
            first_name: first_name.into(),
            birthday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    PersonId,
    FirstName,
    Birthday,
}

impl FieldSelector for PersonField {
    const ALL: &'static [Self] = &[PersonField::PersonId, PersonField::FirstName, PersonField::Birthday];

    fn column(self) -> &'static str {
        match self {
            PersonField::PersonId => "person_id",
            PersonField::FirstName => "first_name",
            PersonField::Birthday => "birthday",
        }
    }
}

impl TableShape for Person {
    const TABLE: &'static str = "persons";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::new("person_id", "INTEGER").primary_key(),
        ColumnDef::new("first_name", "VARCHAR(128)").not_null(),
        ColumnDef::new("birthday", "DATE").not_null(),
    ];
}

impl Record for Person {
    type Field = PersonField;
    type Id = i64;

    const ID: PersonField = PersonField::PersonId;

    fn value(&self, field: PersonField) -> &dyn ToSql {
        match field {
            PersonField::PersonId => &self.person_id,
            PersonField::FirstName => &self.first_name,
            PersonField::Birthday => &self.birthday,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Person {
            person_id: row.get("person_id")?,
            first_name: row.get("first_name")?,
            birthday: row.get("birthday")?,
        })
    }

    fn compare(&self, other: &Self) -> Vec<&'static str> {
        PersonField::ALL
            .iter()
            .filter(|field| match field {
                PersonField::PersonId => self.person_id != other.person_id,
                PersonField::FirstName => self.first_name != other.first_name,
                PersonField::Birthday => self.birthday != other.birthday,
            })
            .map(|field| field.column())
            .collect()
    }
}

/// Desired structure of the `better_persons` table: every `Person` column
/// plus optional descriptive ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetterPerson {
    pub person_id: i64,
    pub first_name: String,
    pub family_name: Option<String>,
    pub birthday: NaiveDate,
    pub birthplace: Option<String>,
    pub occupation: Option<String>,
    pub hobby: Option<String>,
}

impl BetterPerson {
    pub fn from_person(person: Person) -> Self {
        BetterPerson {
            person_id: person.person_id,
            first_name: person.first_name,
            family_name: None,
            birthday: person.birthday,
            birthplace: None,
            occupation: None,
            hobby: None,
        }
    }

    /// The `Person` fields of this record.
    pub fn base(&self) -> Person {
        Person::new(self.person_id, self.first_name.clone(), self.birthday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetterPersonField {
    PersonId,
    FirstName,
    FamilyName,
    Birthday,
    Birthplace,
    Occupation,
    Hobby,
}

impl FieldSelector for BetterPersonField {
    const ALL: &'static [Self] = &[
        BetterPersonField::PersonId,
        BetterPersonField::FirstName,
        BetterPersonField::FamilyName,
        BetterPersonField::Birthday,
        BetterPersonField::Birthplace,
        BetterPersonField::Occupation,
        BetterPersonField::Hobby,
    ];

    fn column(self) -> &'static str {
        match self {
            BetterPersonField::PersonId => "person_id",
            BetterPersonField::FirstName => "first_name",
            BetterPersonField::FamilyName => "family_name",
            BetterPersonField::Birthday => "birthday",
            BetterPersonField::Birthplace => "birthplace",
            BetterPersonField::Occupation => "occupation",
            BetterPersonField::Hobby => "hobby",
        }
    }
}

impl TableShape for BetterPerson {
    const TABLE: &'static str = "better_persons";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::new("person_id", "INTEGER").primary_key(),
        ColumnDef::new("first_name", "VARCHAR(128)").not_null(),
        ColumnDef::new("family_name", "VARCHAR(128)"),
        ColumnDef::new("birthday", "DATE").not_null(),
        ColumnDef::new("birthplace", "VARCHAR(256)"),
        ColumnDef::new("occupation", "VARCHAR(256)"),
        ColumnDef::new("hobby", "VARCHAR(512)"),
    ];
}
