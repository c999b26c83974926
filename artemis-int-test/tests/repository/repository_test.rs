use crate::mapping::{director, person, worker, Director, Person, Worker};
use artemis::errors::ErrorKind;
use artemis::repository::{QueryResult, Repository, RepositoryDefinition, ReturnShape};
use artemis::store::DatabaseQualifier;
use artemis::val;
use artemis_int_test::test_util::{cleanup, create_test_context, private_compiler, run_test, TestContext};
use std::time::Duration;

fn people(ctx: &TestContext) -> Repository<Person> {
    let definition = RepositoryDefinition::with_compiler(
        &private_compiler(),
        &[
            ("findByName", ReturnShape::Instance),
            ("getByAge", ReturnShape::Optional),
            ("findByAgeGreaterThanOrderByAgeDesc", ReturnShape::List),
            ("findByNameLike", ReturnShape::Set),
            ("findByAgeBetweenOrderByAge", ReturnShape::Stream),
            ("existsByName", ReturnShape::Boolean),
            ("deleteByAgeLessThan", ReturnShape::Unit),
        ],
    )
    .unwrap();
    ctx.artemis()
        .repository::<Person>(&DatabaseQualifier::of_document(), &definition)
        .unwrap()
}

fn seed(repository: &Repository<Person>) {
    repository
        .save_all(&[
            person(1, "Ada", 36),
            person(2, "Grace", 45),
            person(3, "Alan", 41),
            person(4, "Barbara", 28),
        ])
        .unwrap();
}

#[test]
fn test_save_and_find_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            let saved = repository.save(&person(1, "Ada", 36))?;
            assert_eq!(saved, person(1, "Ada", 36));

            assert_eq!(repository.find_by_id(val!(1i64))?, Some(person(1, "Ada", 36)));
            assert_eq!(repository.find_by_id(val!(2i64))?, None);
            assert_eq!(ctx.document_store().count("Person"), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_save_all_uses_the_bulk_path() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);
            assert_eq!(ctx.document_store().bulk_inserts(), 1);
            assert_eq!(repository.find_all()?.len(), 4);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_instance_and_optional_shapes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let grace = repository.invoke("findByName", &[val!("Grace")])?;
            assert!(matches!(grace, QueryResult::Instance(Some(_))));
            assert_eq!(grace.into_single(), Some(person(2, "Grace", 45)));

            let nobody = repository.invoke("findByName", &[val!("Linus")])?;
            assert!(matches!(nobody, QueryResult::Instance(None)));

            let alan = repository.invoke("getByAge", &[val!(41)])?;
            assert!(matches!(alan, QueryResult::Optional(Some(ref p)) if p.name == "Alan"));

            let absent = repository.invoke("getByAge", &[val!(99)])?;
            assert!(matches!(absent, QueryResult::Optional(None)));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_list_shape_follows_ordering_clause() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let result = repository.invoke("findByAgeGreaterThanOrderByAgeDesc", &[val!(30)])?;
            let names: Vec<String> = result.into_vec()?.into_iter().map(|p| p.name).collect();
            assert_eq!(names, vec!["Grace", "Alan", "Ada"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_set_shape_is_distinct() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let result = repository.invoke("findByNameLike", &[val!("A%")])?;
            let QueryResult::Set(found) = result else {
                panic!("expected a set result");
            };
            let mut ids: Vec<i64> = found.iter().map(|p| p.id).collect();
            ids.sort();
            assert_eq!(ids, vec![1, 3]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_stream_shape_converts_lazily() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let result = repository.invoke("findByAgeBetweenOrderByAge", &[val!(28), val!(41)])?;
            let QueryResult::Stream(mut stream) = result else {
                panic!("expected a stream result");
            };
            assert_eq!(stream.remaining(), 3);

            let first = stream.next().unwrap()?;
            assert_eq!(first.name, "Barbara");
            assert_eq!(stream.remaining(), 2);

            let rest: Vec<Person> = stream.collect::<Result<_, _>>()?;
            assert_eq!(rest.iter().map(|p| p.age).collect::<Vec<_>>(), vec![Some(36), Some(41)]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_exists_and_delete_methods() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let exists = repository.invoke("existsByName", &[val!("Barbara")])?;
            assert_eq!(exists.as_bool(), Some(true));

            let deleted = repository.invoke("deleteByAgeLessThan", &[val!(40)])?;
            assert!(deleted.is_unit());
            assert_eq!(ctx.document_store().count("Person"), 2);

            let exists = repository.invoke("existsByName", &[val!("Barbara")])?;
            assert_eq!(exists.as_bool(), Some(false));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_update_and_delete_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);

            let mut ada = person(1, "Ada", 36);
            ada.age = Some(37);
            assert_eq!(repository.update(&ada)?, ada);
            assert_eq!(repository.find_by_id(val!(1i64))?.and_then(|p| p.age), Some(37));

            repository.delete_by_id(val!(1i64))?;
            assert_eq!(repository.find_by_id(val!(1i64))?, None);
            assert_eq!(repository.find_all()?.len(), 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_save_with_ttl_expires() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            repository.save_with_ttl(&person(9, "Ephemeral", 20), Duration::from_millis(50))?;
            assert_eq!(ctx.document_store().count("Person"), 1);

            awaitility::at_most(Duration::from_secs(2))
                .until(|| ctx.document_store().count("Person") == 0);
            assert_eq!(repository.find_by_id(val!(9i64))?, None);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_save_all_with_ttl_expires_every_entity() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            repository.save(&person(1, "Ada", 36))?;
            let saved = repository.save_all_with_ttl(
                &[person(8, "Brief", 20), person(9, "Ephemeral", 21)],
                Duration::from_millis(50),
            )?;
            assert_eq!(saved, vec![person(8, "Brief", 20), person(9, "Ephemeral", 21)]);
            assert_eq!(ctx.document_store().count("Person"), 3);
            assert_eq!(ctx.document_store().bulk_inserts(), 0);

            awaitility::at_most(Duration::from_secs(2))
                .until(|| ctx.document_store().count("Person") == 1);
            assert_eq!(repository.find_all()?, vec![person(1, "Ada", 36)]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_column_store_repository_with_overridden_columns() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.column_store().with_key("workers", "code");
            let definition = RepositoryDefinition::with_compiler(
                &private_compiler(),
                &[("findBySalaryGreaterThanOrderBySalary", ReturnShape::List)],
            )?;
            let workers = ctx
                .artemis()
                .repository::<Worker>(&DatabaseQualifier::of_column(), &definition)?;

            workers.save_all(&[
                worker("W-1", 3000, "Lisbon"),
                worker("W-2", 1500, "Porto"),
                worker("W-3", 2500, "Braga"),
            ])?;
            assert_eq!(ctx.column_store().bulk_inserts(), 0);
            assert_eq!(ctx.column_store().count("workers"), 3);

            let rich = workers
                .invoke("findBySalaryGreaterThanOrderBySalary", &[val!("20.00")])?
                .into_vec()?;
            let codes: Vec<&str> = rich.iter().map(|w| w.id.as_str()).collect();
            assert_eq!(codes, vec!["W-3", "W-1"]);

            let found = workers.find_by_id(val!("W-2"))?;
            assert_eq!(found.and_then(|w| w.address).map(|a| a.city), Some("Porto".to_string()));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_embedded_field_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let definition = RepositoryDefinition::with_compiler(
                &private_compiler(),
                &[("findByName", ReturnShape::List)],
            )?;
            let directors = ctx
                .artemis()
                .repository::<Director>(&DatabaseQualifier::of_document(), &definition)?;
            directors.save(&director(1, "Nolan", "Inception", 2010))?;
            directors.save(&director(2, "Wachowski", "Matrix", 1999))?;

            let found = directors.invoke("findByName", &[val!("Nolan")])?.into_vec()?;
            assert_eq!(found, vec![director(1, "Nolan", "Inception", 2010)]);

            let template = ctx.artemis().template(&DatabaseQualifier::of_document())?;
            let query = artemis::query::SelectQuery::new("Director")
                .with_condition(artemis::query::Condition::eq("movie.title", "Matrix"));
            let matrix: Vec<Director> = template.select(&query)?;
            assert_eq!(matrix.len(), 1);
            assert_eq!(matrix[0].movie.year, 1999);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_non_unique_instance_is_an_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let repository = people(&ctx);
            seed(&repository);
            repository.save(&person(5, "Ada", 52))?;

            let err = repository.invoke("findByName", &[val!("Ada")]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NonUniqueResultError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
