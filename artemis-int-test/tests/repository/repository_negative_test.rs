use crate::mapping::{person, Person};
use artemis::common::Value;
use artemis::errors::ErrorKind;
use artemis::repository::{RepositoryDefinition, ReturnShape};
use artemis::store::DatabaseQualifier;
use artemis::val;
use artemis_int_test::test_util::{cleanup, create_test_context, private_compiler, run_test};

#[test]
fn test_shape_must_fit_the_method_kind() {
    let compiler = private_compiler();
    let cases = [
        ("deleteByName", ReturnShape::List),
        ("existsByName", ReturnShape::Optional),
        ("findByName", ReturnShape::Boolean),
        ("getByName", ReturnShape::Unit),
    ];
    for (method, shape) in cases {
        let err = RepositoryDefinition::with_compiler(&compiler, &[(method, shape)]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DynamicQueryError, "{}", method);
        assert_eq!(err.message(), format!("Method {} cannot return {}", method, shape));
    }
}

#[test]
fn test_duplicate_method_is_rejected() {
    let err = RepositoryDefinition::with_compiler(
        &private_compiler(),
        &[("findByName", ReturnShape::List), ("findByName", ReturnShape::Optional)],
    )
    .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
}

#[test]
fn test_malformed_method_fails_the_definition() {
    let err = RepositoryDefinition::with_compiler(
        &private_compiler(),
        &[("searchByName", ReturnShape::List)],
    )
    .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
}

#[test]
fn test_undeclared_method() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(&private_compiler(), &[])?;
            let repository = ctx
                .artemis()
                .repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;

            let err = repository.invoke("findByName", &[val!("Ada")]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
            assert!(err.message().contains("findByName"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_missing_and_null_arguments() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(
                &private_compiler(),
                &[
                    ("findByNameAndAge", ReturnShape::List),
                    ("findByAgeBetween", ReturnShape::List),
                ],
            )?;
            let repository = ctx
                .artemis()
                .repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;
            repository.save(&person(1, "Ada", 36))?;

            let err = repository.invoke("findByNameAndAge", &[val!("Ada")]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);

            let err = repository.invoke("findByAgeBetween", &[val!(1)]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);

            let err = repository
                .invoke("findByNameAndAge", &[Value::Null, val!(36)])
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NullArgument);
            assert_eq!(err.message(), "argument 0 is required");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_null_identifier() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(&private_compiler(), &[])?;
            let repository = ctx
                .artemis()
                .repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;

            let err = repository.find_by_id(Value::Null).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NullArgument);

            let err = repository.delete_by_id(Value::Null).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NullArgument);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_of_missing_entity_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(&private_compiler(), &[])?;
            let repository = ctx
                .artemis()
                .repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;

            let err = repository.update(&person(42, "Nobody", 1)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreError);
            assert_eq!(ctx.document_store().count("Person"), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unbound_qualifier() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(&private_compiler(), &[])?;
            let result = ctx
                .artemis()
                .repository::<Person>(&DatabaseQualifier::of_document_provider("mongo"), &definition);
            let err = result.err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::IllegalStateError);
            assert_eq!(err.message(), "No RecordManager is bound to DOCUMENT@mongo");
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
