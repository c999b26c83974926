//! # Artemis - Entity Mapping for NoSQL Stores
//!
//! Artemis maps application entities to store-neutral records and back, and
//! turns repository method names such as `findByNameAndAgeGreaterThan` into
//! query condition trees. Storage itself is left to external drivers plugged
//! in behind the [store] boundary.
//!
//! ## Key Features
//!
//! - **Metadata**: per-type descriptors built once from a field declaration and cached
//! - **Conversion**: entity to record and back, with embedded and sub-entity composition
//! - **Query Methods**: a method-name grammar compiled once per name
//! - **Repositories**: query methods adapted to instance, optional, list, set or stream shapes
//! - **Persist Workflow**: ordered listeners around every save and update
//! - **Templates**: synchronous and callback-based asynchronous entity operations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use artemis::artemis::Artemis;
//! use artemis::repository::{RepositoryDefinition, ReturnShape};
//! use artemis::store::{memory::MemoryRecordManager, DatabaseQualifier, DatabaseType, RecordManager};
//! use artemis_derive::{Convertible, Entity};
//!
//! #[derive(Entity, Default, Debug, Clone, PartialEq)]
//! pub struct Person {
//!     #[id]
//!     pub id: i64,
//!     pub name: String,
//!     pub age: Option<i32>,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let artemis = Artemis::builder()
//!     .manager(
//!         DatabaseQualifier::of_document(),
//!         RecordManager::new(MemoryRecordManager::new(DatabaseType::Document)),
//!     )
//!     .build()?;
//!
//! let definition = RepositoryDefinition::new(&[("findByAgeGreaterThan", ReturnShape::List)])?;
//! let people = artemis.repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;
//! people.save(&Person { id: 1, name: "Ada".into(), age: Some(36) })?;
//!
//! let adults = people.invoke("findByAgeGreaterThan", &[artemis::val!(17)])?.into_vec()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`artemis`] - The assembled engine
//! - [`artemis_builder`] - Engine builder
//! - [`artemis_config`] - Engine configuration and store bindings
//! - [`common`] - Values, records and conversions
//! - [`errors`] - Error types and result definitions
//! - [`mapping`] - Metadata registry and entity converter
//! - [`query`] - Conditions, statements and the method-name compiler
//! - [`repository`] - Repositories answering query methods
//! - [`store`] - Store driver boundary and in-memory drivers
//! - [`template`] - Entity templates
//! - [`workflow`] - Persist workflow and listeners

use crate::common::*;
use std::sync::LazyLock;

pub mod artemis;
pub mod artemis_builder;
pub mod artemis_config;
pub mod common;
pub mod errors;
pub mod mapping;
pub mod query;
pub mod repository;
pub mod store;
pub mod template;
pub mod workflow;

pub(crate) static FIELD_SEPARATOR: LazyLock<Atomic<String>> =
    LazyLock::new(|| atomic(DEFAULT_FIELD_SEPARATOR.to_string()));
