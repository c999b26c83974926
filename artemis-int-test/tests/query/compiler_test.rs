use artemis::common::{SortOrder, Value};
use artemis::errors::ErrorKind;
use artemis::query::{Condition, Connector, Operand, Operator, QueryCompiler, QueryKind};
use artemis::val;
use artemis_int_test::test_util::private_compiler;
use std::sync::Arc;
use std::thread;

#[test]
fn test_prefixes_select_the_query_kind() {
    let compiler = private_compiler();
    let cases = [
        ("findByName", QueryKind::Find),
        ("getByName", QueryKind::Get),
        ("deleteByName", QueryKind::Delete),
        ("existsByName", QueryKind::Exists),
    ];
    for (method, kind) in cases {
        assert_eq!(compiler.compile(method).unwrap().kind(), kind, "{}", method);
    }
}

#[test]
fn test_unknown_prefix_is_rejected() {
    let err = private_compiler().compile("countByName").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
}

#[test]
fn test_method_without_condition_is_rejected() {
    let compiler = private_compiler();
    assert_eq!(
        compiler.compile("findBy").unwrap_err().kind(),
        &ErrorKind::DynamicQueryError
    );
    assert_eq!(
        compiler.compile("findByOrderByName").unwrap_err().kind(),
        &ErrorKind::DynamicQueryError
    );
}

#[test]
fn test_suffixes_pick_operators() {
    let method = private_compiler()
        .compile("findByAgeGreaterThanAndNameLikeOrScoreLessEqualThan")
        .unwrap();

    let clauses: Vec<(&str, Operator)> = method
        .clauses()
        .iter()
        .map(|clause| (clause.field(), clause.operator()))
        .collect();
    assert_eq!(
        clauses,
        vec![
            ("age", Operator::GreaterThan),
            ("name", Operator::Like),
            ("score", Operator::LessThanEqual),
        ]
    );
    assert_eq!(method.connectors(), &[Connector::And, Connector::Or]);
    assert_eq!(method.arity(), 3);
}

#[test]
fn test_condition_folds_left_to_right() {
    let method = private_compiler().compile("findByNameAndAgeGreaterThan").unwrap();
    let condition = method.bind(&[val!("Ada"), val!(30)]).unwrap();

    assert_eq!(
        condition,
        Condition::eq("name", "Ada").and(Condition::leaf(
            "age",
            Operator::GreaterThan,
            Operand::Single(val!(30)),
        ))
    );
    assert_eq!(
        condition.to_string(),
        "((name EQUALS \"Ada\") AND (age GREATER_THAN 30))"
    );
}

#[test]
fn test_mixed_connectors_are_left_deep() {
    let method = private_compiler().compile("findByNameOrNameAndAge").unwrap();
    let condition = method.bind(&[val!("Ada"), val!("Grace"), val!(45)]).unwrap();

    let expected = Condition::eq("name", "Ada")
        .or(Condition::eq("name", "Grace"))
        .and(Condition::eq("age", 45));
    assert_eq!(condition, expected);
}

#[test]
fn test_between_consumes_two_arguments() {
    let method = private_compiler().compile("findByAgeBetween").unwrap();
    assert_eq!(method.arity(), 2);

    let condition = method.bind(&[val!(18), val!(65)]).unwrap();
    assert_eq!(
        condition,
        Condition::leaf("age", Operator::Between, Operand::Pair(val!(18), val!(65)))
    );

    let err = method.bind(&[val!(18)]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
    assert!(err.message().contains("findByAgeBetween"));
}

#[test]
fn test_between_then_equality_takes_arguments_in_order() {
    let method = private_compiler().compile("findByAgeBetweenAndName").unwrap();
    let condition = method.bind(&[val!(18), val!(65), val!("Ada")]).unwrap();
    let criteria = condition.criteria();

    assert_eq!(criteria[0].operand(), &Operand::Pair(val!(18), val!(65)));
    assert_eq!(criteria[1].operand(), &Operand::Single(val!("Ada")));
}

#[test]
fn test_null_argument_is_rejected() {
    let method = private_compiler().compile("findByNameAndAge").unwrap();
    let err = method.bind(&[val!("Ada"), Value::Null]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NullArgument);
    assert!(err.message().contains("argument 1"));
}

#[test]
fn test_trailing_arguments_are_ignored() {
    let method = private_compiler().compile("findByName").unwrap();
    let condition = method.bind(&[val!("Ada"), val!("ignored")]).unwrap();
    assert_eq!(condition, Condition::eq("name", "Ada"));
}

#[test]
fn test_ordering_clause() {
    let method = private_compiler()
        .compile("findByAgeGreaterThanOrderByNameDescAndAge")
        .unwrap();
    let sorts: Vec<(&str, SortOrder)> = method
        .sorts()
        .iter()
        .map(|sort| (sort.field(), sort.order()))
        .collect();
    assert_eq!(
        sorts,
        vec![("name", SortOrder::Descending), ("age", SortOrder::Ascending)]
    );

    let select = method.select("Person", &[val!(21)]).unwrap();
    assert_eq!(
        select.to_string(),
        "select from Person where (age GREATER_THAN 21) order by name DESC, age ASC"
    );
}

#[test]
fn test_delete_drops_ordering() {
    let method = private_compiler().compile("deleteByNameOrderByAge").unwrap();
    let delete = method.delete("Person", &[val!("Ada")]).unwrap();
    assert_eq!(delete.name(), "Person");
    assert_eq!(delete.condition(), Some(&Condition::eq("name", "Ada")));
}

#[test]
fn test_legacy_connectors() {
    let method = private_compiler().compile("findByNameANDAgeORCity").unwrap();
    assert_eq!(method.clauses().len(), 3);
    assert_eq!(method.connectors(), &[Connector::And, Connector::Or]);
}

#[test]
fn test_compilation_is_cached_per_name() {
    let compiler = private_compiler();
    let first = compiler.compile("findByName").unwrap();
    let second = compiler.compile("findByName").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(compiler.size(), 1);

    assert!(compiler.compile("findBy").is_err());
    assert!(!compiler.contains("findBy"));
    assert_eq!(compiler.size(), 1);
}

#[test]
fn test_concurrent_compilation_shares_one_method() {
    let compiler = QueryCompiler::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let compiler = compiler.clone();
            thread::spawn(move || compiler.compile("findByNameAndAgeLessThan").unwrap())
        })
        .collect();

    let methods: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(methods.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(compiler.size(), 1);
}
