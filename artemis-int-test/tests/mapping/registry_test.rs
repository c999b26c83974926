use crate::mapping::{Address, Customer, Director, Movie, Person, Worker};
use artemis::mapping::{FieldKind, MetadataRegistry};
use std::sync::Arc;
use std::thread;

#[test]
fn test_derived_descriptor_defaults() {
    let registry = MetadataRegistry::new();
    let descriptor = registry.describe::<Person>().unwrap();

    assert_eq!(descriptor.name(), "Person");
    assert_eq!(descriptor.id().map(|id| id.name()), Some("_id"));
    assert_eq!(descriptor.field("phones").map(|f| f.kind()), Some(FieldKind::Collection));
    assert_eq!(descriptor.field("age").map(|f| f.kind()), Some(FieldKind::Plain));
}

#[test]
fn test_derived_descriptor_overrides() {
    let registry = MetadataRegistry::new();
    let descriptor = registry.describe::<Worker>().unwrap();

    assert_eq!(descriptor.name(), "workers");
    assert_eq!(descriptor.id().map(|id| id.field_name()), Some("id"));
    assert_eq!(descriptor.id().map(|id| id.name()), Some("code"));
    assert_eq!(descriptor.field("salary").map(|f| f.name()), Some("money"));
    assert!(descriptor.field("salary").and_then(|f| f.converter()).is_some());
    assert!(descriptor.field("session").is_none());
    assert_eq!(descriptor.field_by_column("money").map(|f| f.field_name()), Some("salary"));
}

#[test]
fn test_nested_kinds_follow_embeddability() {
    let registry = MetadataRegistry::new();

    let director = registry.describe::<Director>().unwrap();
    assert_eq!(director.field("movie").map(|f| f.kind()), Some(FieldKind::Embedded));

    let worker = registry.describe::<Worker>().unwrap();
    assert_eq!(worker.field("address").map(|f| f.kind()), Some(FieldKind::SubEntity));

    let customer = registry.describe::<Customer>().unwrap();
    assert_eq!(customer.field("balance").map(|f| f.kind()), Some(FieldKind::Plain));
    assert_eq!(customer.field("notes").map(|f| f.kind()), Some(FieldKind::Map));

    assert!(registry.contains::<Movie>());
    assert!(registry.contains::<Address>());
}

#[test]
fn test_column_names_follow_nesting() {
    let registry = MetadataRegistry::new();

    let director = registry.describe::<Director>().unwrap();
    assert_eq!(director.column_name("movie.title").as_deref(), Some("movie.title"));
    assert_eq!(director.column_name("movie.rating"), None);

    let worker = registry.describe::<Worker>().unwrap();
    assert_eq!(worker.column_name("address.zip").as_deref(), Some("zip_code"));
    assert_eq!(worker.column_name("zip").as_deref(), Some("zip_code"));
    assert_eq!(worker.column_name("salary").as_deref(), Some("money"));
}

#[test]
fn test_describe_is_cached() {
    let registry = MetadataRegistry::new();
    let first = registry.describe::<Worker>().unwrap();
    let second = registry.describe::<Worker>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // Worker and its Address
    assert_eq!(registry.size(), 2);
}

#[test]
fn test_concurrent_describe_shares_one_descriptor() {
    let registry = MetadataRegistry::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || registry.describe::<Director>().unwrap())
        })
        .collect();

    let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let reference = registry.describe::<Director>().unwrap();
    assert!(descriptors.iter().all(|d| Arc::ptr_eq(d, &reference)));
}
