use crate::mapping::{person, random_worker, Person, Worker};
use artemis::repository::{Repository, RepositoryDefinition, ReturnShape};
use artemis::store::DatabaseQualifier;
use artemis::val;
use artemis_int_test::test_util::{cleanup, create_test_context, private_compiler, run_test, TestContext};

fn people(ctx: &TestContext) -> Repository<Person> {
    let definition = RepositoryDefinition::with_compiler(
        &private_compiler(),
        &[
            ("findByNameOrAge", ReturnShape::List),
            ("findByAgeGreaterEqualThanAndAgeLessEqualThan", ReturnShape::List),
            ("findByNameLikeOrderByNameDesc", ReturnShape::List),
            ("findByNameLikeAndAgeLessThanOrAgeGreaterThanOrderByAge", ReturnShape::List),
        ],
    )
    .unwrap();
    let repository = ctx
        .artemis()
        .repository::<Person>(&DatabaseQualifier::of_document(), &definition)
        .unwrap();
    repository
        .save_all(&[
            person(1, "Ada", 36),
            person(2, "Grace", 45),
            person(3, "Alan", 41),
            person(4, "Barbara", 28),
            person(5, "Anita", 60),
        ])
        .unwrap();
    repository
}

fn names(people: Vec<Person>) -> Vec<String> {
    people.into_iter().map(|p| p.name).collect()
}

#[test]
fn test_or_connector() {
    run_test(
        || create_test_context(),
        |ctx| {
            let found = people(&ctx)
                .invoke("findByNameOrAge", &[val!("Ada"), val!(45)])?
                .into_vec()?;
            assert_eq!(names(found), vec!["Ada", "Grace"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_inclusive_range_operators() {
    run_test(
        || create_test_context(),
        |ctx| {
            let found = people(&ctx)
                .invoke(
                    "findByAgeGreaterEqualThanAndAgeLessEqualThan",
                    &[val!(36), val!(45)],
                )?
                .into_vec()?;
            assert_eq!(names(found), vec!["Ada", "Grace", "Alan"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_like_with_descending_order() {
    run_test(
        || create_test_context(),
        |ctx| {
            let found = people(&ctx)
                .invoke("findByNameLikeOrderByNameDesc", &[val!("A%")])?
                .into_vec()?;
            assert_eq!(names(found), vec!["Anita", "Alan", "Ada"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_connectors_fold_without_precedence() {
    run_test(
        || create_test_context(),
        |ctx| {
            // ((name LIKE A%) AND (age < 40)) OR (age > 44)
            let found = people(&ctx)
                .invoke(
                    "findByNameLikeAndAgeLessThanOrAgeGreaterThanOrderByAge",
                    &[val!("A%"), val!(40), val!(44)],
                )?
                .into_vec()?;
            assert_eq!(names(found), vec!["Ada", "Grace", "Anita"]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_sub_entity_field_by_bare_name() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.document_store().with_key("workers", "code");
            let definition = RepositoryDefinition::with_compiler(
                &private_compiler(),
                &[("findByCity", ReturnShape::List), ("existsById", ReturnShape::Boolean)],
            )?;
            let workers = ctx
                .artemis()
                .repository::<Worker>(&DatabaseQualifier::of_document(), &definition)?;

            let mut batch: Vec<Worker> = (1..=20)
                .map(|i| random_worker(&format!("W-{:02}", i), 1000 + i))
                .collect();
            for worker in batch.iter_mut().step_by(5) {
                if let Some(address) = worker.address.as_mut() {
                    address.city = "Coimbra".to_string();
                }
            }
            workers.save_all(&batch)?;

            let found = workers.invoke("findByCity", &[val!("Coimbra")])?.into_vec()?;
            let codes: Vec<String> = found.into_iter().map(|w| w.id).collect();
            assert_eq!(codes, vec!["W-01", "W-06", "W-11", "W-16"]);

            assert_eq!(workers.invoke("existsById", &[val!("W-20")])?.as_bool(), Some(true));
            assert_eq!(workers.invoke("existsById", &[val!("W-21")])?.as_bool(), Some(false));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
