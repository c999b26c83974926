mod converter_test;
mod registry_test;

use artemis::common::Value;
use artemis::errors::{ErrorKind, MappingError, MappingResult};
use artemis::mapping::AttributeConverter;
use artemis_derive::{Convertible, Entity};
use chrono::NaiveDate;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::Name;
use fake::Fake;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Person {
    #[id]
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub phones: Vec<String>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
#[entity(embeddable)]
pub struct Movie {
    pub title: String,
    pub year: i32,
    pub actors: BTreeSet<String>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Director {
    #[id]
    pub id: i64,
    pub name: String,
    #[column(nested)]
    pub movie: Movie,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[column(name = "zip_code")]
    pub zip: Option<String>,
}

#[derive(Convertible, Debug, Clone, Copy, Default, PartialEq)]
pub enum Level {
    #[default]
    Junior,
    Senior,
}

/// Stores cents as a decimal string such as `"12.50"`.
#[derive(Default)]
pub struct MoneyConverter;

impl AttributeConverter for MoneyConverter {
    fn to_record_value(&self, value: &Value) -> MappingResult<Value> {
        match value.as_integer() {
            Some(cents) => Ok(Value::String(format!("{}.{:02}", cents / 100, cents % 100))),
            None => Err(MappingError::new(
                &format!("{} is not an amount", value),
                ErrorKind::MappingError,
            )),
        }
    }

    fn to_entity_value(&self, value: &Value) -> MappingResult<Value> {
        let text = value.as_string().ok_or_else(|| {
            MappingError::new(&format!("{} is not a string", value), ErrorKind::MappingError)
        })?;
        let (units, cents) = text.split_once('.').ok_or_else(|| {
            MappingError::new(&format!("{} has no cents", text), ErrorKind::MappingError)
        })?;
        Ok(Value::I64(units.parse::<i64>()? * 100 + cents.parse::<i64>()?))
    }
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
#[entity(name = "workers")]
pub struct Worker {
    #[id(name = "code")]
    pub id: String,
    pub name: String,
    #[column(name = "money", converter = MoneyConverter)]
    pub salary: i64,
    pub level: Level,
    pub hired: Option<NaiveDate>,
    #[column(nested)]
    pub address: Option<Address>,
    #[column(skip)]
    pub session: Option<String>,
}

#[derive(Convertible, Debug, Clone, Default, PartialEq)]
pub struct Balance {
    pub amount: i64,
    pub currency: String,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Customer {
    #[id]
    pub id: i64,
    pub name: String,
    pub balance: Balance,
    pub notes: BTreeMap<String, String>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Company {
    pub name: String,
    pub country: String,
}

/// Its company's `name` would land on the same column as its own.
#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Employee {
    #[id]
    pub id: i64,
    pub name: String,
    #[column(nested)]
    pub company: Option<Company>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Agency {
    #[column(name = "agency_name")]
    pub name: String,
    pub country: Option<String>,
}

#[derive(Entity, Debug, Clone, Default, PartialEq)]
pub struct Contractor {
    #[id]
    pub id: i64,
    pub name: String,
    #[column(nested)]
    pub agency: Option<Agency>,
}

pub fn person(id: i64, name: &str, age: i32) -> Person {
    Person {
        id,
        name: name.to_string(),
        age: Some(age),
        phones: vec![format!("555-{:04}", id)],
    }
}

pub fn director(id: i64, name: &str, title: &str, year: i32) -> Director {
    Director {
        id,
        name: name.to_string(),
        movie: Movie {
            title: title.to_string(),
            year,
            actors: BTreeSet::from(["Keanu".to_string(), "Carrie-Anne".to_string()]),
        },
    }
}

pub fn worker(code: &str, salary: i64, city: &str) -> Worker {
    Worker {
        id: code.to_string(),
        name: Name().fake(),
        salary,
        level: Level::Junior,
        hired: NaiveDate::from_ymd_opt(2020, 1, 15),
        address: Some(Address {
            street: StreetName().fake(),
            city: city.to_string(),
            zip: None,
        }),
        session: None,
    }
}

pub fn random_worker(code: &str, salary: i64) -> Worker {
    worker(code, salary, &CityName().fake::<String>())
}
