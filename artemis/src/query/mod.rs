//! Query method compilation and in-memory condition evaluation.
//!
//! A repository method name such as `findByNameAndAgeGreaterThanOrderByName`
//! is parsed once into a [QueryMethod]. Binding call arguments to it yields a
//! [Condition] tree and, for finders, an ordering clause:
//!
//! ```rust,ignore
//! let method = QueryCompiler::global().compile("findByNameAndAgeGreaterThan")?;
//! let query = method.select("Person", &[val!("Ada"), val!(20)])?;
//! // select from Person where ((name EQUALS "Ada") AND (age GREATER_THAN 20))
//! ```
//!
//! # Grammar
//!
//! - **Prefixes**: `findBy`, `getBy`, `deleteBy`, `existsBy`
//! - **Connectors**: `And`, `Or` (also `AND`, `OR`), folded strictly left to right
//! - **Suffixes**: `Between`, `LessThan`, `GreaterThan`, `LessEqualThan`,
//!   `GreaterEqualThan`, `Like`; no suffix means equality
//! - **Ordering**: `OrderBy` followed by fields joined with `And`, each with an
//!   optional `Asc` or `Desc`

mod compiler;
mod condition;
mod operator;
mod parser;
mod statement;

pub use compiler::*;
pub use condition::*;
pub use operator::*;
pub use parser::*;
pub use statement::*;
