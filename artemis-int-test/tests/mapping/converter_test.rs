use crate::mapping::{
    director, person, worker, Agency, Balance, Contractor, Customer, Director, Employee, Level,
    Person, Worker,
};
use artemis::common::{Record, Value};
use artemis::errors::ErrorKind;
use artemis::mapping::{EntityConverter, MetadataRegistry};
use artemis::record;
use std::collections::BTreeMap;

fn converter() -> EntityConverter {
    EntityConverter::new(MetadataRegistry::new())
}

#[test]
fn test_identifier_comes_first() {
    let record = converter().to_record(&person(1, "Ada", 36)).unwrap();
    assert_eq!(record.name(), "Person");
    assert_eq!(record.names(), vec!["_id", "name", "age", "phones"]);
    assert_eq!(record.find("_id"), Some(&Value::I64(1)));
}

#[test]
fn test_plain_entity_round_trip() {
    let converter = converter();
    let ada = person(7, "Ada", 36);
    let record = converter.to_record(&ada).unwrap();
    let back: Person = converter.to_entity(&record).unwrap();
    assert_eq!(back, ada);
}

#[test]
fn test_null_field_produces_no_entry() {
    let mut ada = person(1, "Ada", 36);
    ada.age = None;
    let record = converter().to_record(&ada).unwrap();
    assert!(!record.contains("age"));

    let back: Person = converter().to_entity(&record).unwrap();
    assert_eq!(back.age, None);
}

#[test]
fn test_embedded_entity_is_a_child_record() {
    let converter = converter();
    let nolan = director(1, "Nolan", "Inception", 2010);
    let record = converter.to_record(&nolan).unwrap();

    let movie = record.find("movie").and_then(Value::as_record).unwrap();
    assert_eq!(movie.find("title"), Some(&Value::from("Inception")));
    assert_eq!(movie.find("year"), Some(&Value::I32(2010)));
    assert!(!record.contains("title"));

    let back: Director = converter.to_entity(&record).unwrap();
    assert_eq!(back, nolan);
}

#[test]
fn test_sub_entity_is_flattened() {
    let converter = converter();
    let mut tom = worker("W-1", 1250, "Lisbon");
    tom.level = Level::Senior;
    let record = converter.to_record(&tom).unwrap();

    assert_eq!(record.name(), "workers");
    assert_eq!(record.names()[0], "code");
    assert_eq!(record.find("money"), Some(&Value::from("12.50")));
    assert_eq!(record.find("level"), Some(&Value::from("Senior")));
    assert_eq!(record.find("hired"), Some(&Value::from("2020-01-15")));
    assert_eq!(record.find("city"), Some(&Value::from("Lisbon")));
    assert!(!record.contains("address"));
    assert!(!record.contains("zip_code"));

    let back: Worker = converter.to_entity(&record).unwrap();
    assert_eq!(back, tom);
}

#[test]
fn test_skipped_field_is_not_stored() {
    let converter = converter();
    let mut tom = worker("W-1", 1000, "Lisbon");
    tom.session = Some("token".to_string());

    let record = converter.to_record(&tom).unwrap();
    assert!(!record.contains("session"));

    let back: Worker = converter.to_entity(&record).unwrap();
    assert_eq!(back.session, None);
}

#[test]
fn test_nested_sub_entity_record_is_accepted() {
    let record = record!("workers", {
        code: "W-2",
        name: "Ana",
        money: "20.00",
        address: { street: "Rua Augusta", city: "Porto", zip_code: "4000" }
    });

    let ana: Worker = converter().to_entity(&record).unwrap();
    let address = ana.address.unwrap();
    assert_eq!(address.city, "Porto");
    assert_eq!(address.zip.as_deref(), Some("4000"));
    assert_eq!(ana.salary, 2000);
}

#[test]
fn test_absent_sub_entity_stays_none() {
    let record = record!("workers", { code: "W-3", name: "Rui", money: "1.05" });
    let rui: Worker = converter().to_entity(&record).unwrap();
    assert_eq!(rui.address, None);
    assert_eq!(rui.salary, 105);
    assert_eq!(rui.level, Level::Junior);
}

#[test]
fn test_convertible_struct_field() {
    let converter = converter();
    let customer = Customer {
        id: 3,
        name: "Acme".to_string(),
        balance: Balance {
            amount: 990,
            currency: "EUR".to_string(),
        },
        notes: BTreeMap::from([("tier".to_string(), "gold".to_string())]),
    };

    let record = converter.to_record(&customer).unwrap();
    let balance = record.find("balance").and_then(Value::as_record).unwrap();
    assert_eq!(balance.find("currency"), Some(&Value::from("EUR")));
    assert!(record.find("notes").map(Value::is_map).unwrap_or(false));

    let back: Customer = converter.to_entity(&record).unwrap();
    assert_eq!(back, customer);
}

#[test]
fn test_unknown_entries_are_ignored() {
    let mut record = converter().to_record(&person(1, "Ada", 36)).unwrap();
    record.put("nickname", "Countess");
    let ada: Person = converter().to_entity(&record).unwrap();
    assert_eq!(ada, person(1, "Ada", 36));
}

#[test]
fn test_empty_record_is_rejected() {
    let result = converter().to_entity::<Person>(&Record::new("Person"));
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::MappingError);
}

#[test]
fn test_converter_failure_names_the_field() {
    let record = record!("workers", { code: "W-4", money: "lots" });
    let err = converter().to_entity::<Worker>(&record).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MappingError);
    assert!(err.message().contains("Worker.salary"));
}

#[test]
fn test_unknown_enum_variant_is_rejected() {
    let record = record!("workers", { code: "W-5", money: "1.00", level: "Intern" });
    let err = converter().to_entity::<Worker>(&record).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MappingError);
}

#[test]
fn test_sub_entity_shadowing_owner_column_is_rejected() {
    let converter = converter();
    let employee = Employee {
        id: 1,
        name: "Ada".to_string(),
        company: None,
    };
    let err = converter.to_record(&employee).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MappingError);
    assert_eq!(err.message(), "Type Employee maps two fields to name");

    let record = record!("Employee", { _id: 1i64, name: "Ada" });
    let err = converter.to_entity::<Employee>(&record).unwrap_err();
    assert_eq!(err.message(), "Type Employee maps two fields to name");
}

#[test]
fn test_owner_entries_do_not_build_a_sub_entity() {
    let converter = converter();
    let record = record!("Contractor", { _id: 4i64, name: "Grace" });
    let grace: Contractor = converter.to_entity(&record).unwrap();
    assert_eq!(grace.name, "Grace");
    assert_eq!(grace.agency, None);

    let record = record!("Contractor", { _id: 5i64, name: "Alan", agency_name: "Bletchley" });
    let alan: Contractor = converter.to_entity(&record).unwrap();
    assert_eq!(alan.name, "Alan");
    assert_eq!(
        alan.agency,
        Some(Agency {
            name: "Bletchley".to_string(),
            country: None,
        })
    );
    assert_eq!(converter.to_record(&alan).unwrap(), record);
}
