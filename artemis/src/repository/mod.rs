//! Repositories answering query methods declared by name.
//!
//! A [RepositoryDefinition] lists the method names a repository understands
//! together with the [ReturnShape] of each. Names follow the query method
//! grammar of [crate::query]; a [Repository] binds positional arguments,
//! runs the query through an [EntityTemplate](crate::template::EntityTemplate)
//! and adapts the reply into a [QueryResult].

mod definition;
mod repository;
mod result;

pub use definition::*;
pub use repository::*;
pub use result::*;
