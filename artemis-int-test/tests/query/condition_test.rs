use artemis::common::Record;
use artemis::query::{Condition, Operand, Operator};
use artemis::{record, val};

fn keanu() -> Record {
    record!("Actor", {
        "_id": 12,
        name: "Keanu Reeves",
        age: 58,
        rating: 8.5,
        movie: { title: "Matrix", year: 1999 }
    })
}

fn leaf(field: &str, operator: Operator, value: artemis::common::Value) -> Condition {
    Condition::leaf(field, operator, Operand::Single(value))
}

#[test]
fn test_equality_across_integer_widths() {
    assert!(Condition::eq("age", 58i64).test(&keanu()).unwrap());
    assert!(Condition::eq("_id", 12u8).test(&keanu()).unwrap());
    assert!(!Condition::eq("age", 57).test(&keanu()).unwrap());
}

#[test]
fn test_ordering_operators() {
    let record = keanu();
    assert!(leaf("age", Operator::GreaterThan, val!(50)).test(&record).unwrap());
    assert!(leaf("age", Operator::GreaterThanEqual, val!(58)).test(&record).unwrap());
    assert!(leaf("age", Operator::LessThanEqual, val!(58)).test(&record).unwrap());
    assert!(!leaf("age", Operator::LessThan, val!(58)).test(&record).unwrap());
    assert!(leaf("rating", Operator::GreaterThan, val!(8)).test(&record).unwrap());
}

#[test]
fn test_between_includes_both_bounds() {
    let record = keanu();
    let between = |low: i32, high: i32| {
        Condition::leaf("age", Operator::Between, Operand::Pair(val!(low), val!(high)))
            .test(&record)
            .unwrap()
    };
    assert!(between(58, 60));
    assert!(between(50, 58));
    assert!(!between(59, 70));
}

#[test]
fn test_like_wildcards() {
    let record = keanu();
    assert!(leaf("name", Operator::Like, val!("Keanu%")).test(&record).unwrap());
    assert!(leaf("name", Operator::Like, val!("%Reeve_")).test(&record).unwrap());
    assert!(!leaf("name", Operator::Like, val!("Keanu")).test(&record).unwrap());
    assert!(!leaf("name", Operator::Like, val!("Keanu.*")).test(&record).unwrap());
}

#[test]
fn test_nested_paths() {
    let record = keanu();
    assert!(Condition::eq("movie.title", "Matrix").test(&record).unwrap());
    assert!(leaf("movie.year", Operator::LessThan, val!(2000)).test(&record).unwrap());
}

#[test]
fn test_missing_field_and_mismatched_kinds_never_match() {
    let record = keanu();
    assert!(!Condition::eq("nickname", "Neo").test(&record).unwrap());
    assert!(!leaf("name", Operator::GreaterThan, val!(3)).test(&record).unwrap());
    assert!(!leaf("age", Operator::Like, val!("5%")).test(&record).unwrap());
}

#[test]
fn test_connectors() {
    let record = keanu();
    let and = Condition::eq("name", "Keanu Reeves").and(Condition::eq("age", 30));
    let or = Condition::eq("name", "Keanu Reeves").or(Condition::eq("age", 30));
    assert!(!and.test(&record).unwrap());
    assert!(or.test(&record).unwrap());
}

#[test]
fn test_renaming_fields_keeps_the_shape() {
    let condition = Condition::eq("salary", 10).or(Condition::eq("id", "W-1"));
    let renamed = condition.map_fields(&|field: &str| match field {
        "salary" => "money".to_string(),
        "id" => "code".to_string(),
        other => other.to_string(),
    });
    assert_eq!(renamed, Condition::eq("money", 10).or(Condition::eq("code", "W-1")));
}
