use crate::common::{Sort, Value};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::query::{
    parse, Clause, Condition, Connector, DeleteQuery, Operand, ParsedMethod, QueryKind, SelectQuery,
};
use dashmap::DashMap;
use std::sync::{Arc, LazyLock};

static GLOBAL_COMPILER: LazyLock<QueryCompiler> = LazyLock::new(QueryCompiler::new);

/// A query method name compiled once and bound per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMethod {
    parsed: ParsedMethod,
}

impl QueryMethod {
    pub fn name(&self) -> &str {
        &self.parsed.name
    }

    pub fn kind(&self) -> QueryKind {
        self.parsed.kind
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.parsed.clauses
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.parsed.connectors
    }

    /// Ordering clause, empty when the name has no `OrderBy` part.
    pub fn sorts(&self) -> &[Sort] {
        &self.parsed.sorts
    }

    /// Number of positional arguments the method consumes.
    pub fn arity(&self) -> usize {
        self.parsed.clauses.iter().map(|c| c.operator().arity()).sum()
    }

    /// Substitutes positional arguments into the clauses and folds them left
    /// to right into a condition tree.
    ///
    /// Fails with `DynamicQueryError` when a clause lacks arguments and with
    /// `NullArgument` when an argument is `Null`.
    pub fn bind(&self, args: &[Value]) -> MappingResult<Condition> {
        let mut remaining = args.iter().enumerate();
        let mut condition: Option<Condition> = None;

        for (index, clause) in self.parsed.clauses.iter().enumerate() {
            let operand = match clause.operator().arity() {
                2 => {
                    let low = self.next_argument(&mut remaining)?;
                    let high = self.next_argument(&mut remaining)?;
                    Operand::Pair(low, high)
                }
                _ => Operand::Single(self.next_argument(&mut remaining)?),
            };

            let leaf = Condition::leaf(clause.field(), clause.operator(), operand);
            condition = Some(match condition {
                None => leaf,
                Some(tree) => tree.combine(self.parsed.connectors[index - 1], leaf),
            });
        }

        let extra = remaining.count();
        if extra > 0 {
            log::warn!("Method {} ignores {} trailing argument(s)", self.name(), extra);
        }

        condition.ok_or_else(|| {
            log::error!("Method {} has no condition", self.name());
            MappingError::new(
                &format!("Method {} has no condition", self.name()),
                ErrorKind::DynamicQueryError,
            )
        })
    }

    /// Builds the select query for a record named `record_name`.
    pub fn select(&self, record_name: &str, args: &[Value]) -> MappingResult<SelectQuery> {
        Ok(SelectQuery::new(record_name)
            .with_condition(self.bind(args)?)
            .with_sorts(self.sorts().iter().cloned()))
    }

    /// Builds the delete query for a record named `record_name`, the ordering
    /// clause takes no part in it.
    pub fn delete(&self, record_name: &str, args: &[Value]) -> MappingResult<DeleteQuery> {
        Ok(DeleteQuery::new(record_name).with_condition(self.bind(args)?))
    }

    fn next_argument<'a>(
        &self,
        remaining: &mut impl Iterator<Item = (usize, &'a Value)>,
    ) -> MappingResult<Value> {
        match remaining.next() {
            Some((index, value)) if value.is_null() => {
                log::error!("Method {} received null for argument {}", self.name(), index);
                Err(MappingError::null_argument(&format!("argument {}", index)))
            }
            Some((_, value)) => Ok(value.clone()),
            None => {
                log::error!("There is a missed argument in the method {}", self.name());
                Err(MappingError::new(
                    &format!("There is a missed argument in the method {}", self.name()),
                    ErrorKind::DynamicQueryError,
                ))
            }
        }
    }
}

/// Compiles query method names and caches the result per name.
///
/// Compilation happens at most once per distinct name for the lifetime of the
/// compiler. Concurrent first compilations of the same name are harmless: both
/// produce the same [QueryMethod] and the first one inserted is kept.
#[derive(Clone, Default)]
pub struct QueryCompiler {
    inner: Arc<QueryCompilerInner>,
}

#[derive(Default)]
struct QueryCompilerInner {
    methods: DashMap<String, Arc<QueryMethod>>,
}

impl QueryCompiler {
    pub fn new() -> Self {
        QueryCompiler {
            inner: Arc::new(QueryCompilerInner::default()),
        }
    }

    /// The process-wide compiler.
    pub fn global() -> QueryCompiler {
        GLOBAL_COMPILER.clone()
    }

    pub fn compile(&self, method: &str) -> MappingResult<Arc<QueryMethod>> {
        let cached = self.inner.methods.get(method).map(|it| it.value().clone());
        if let Some(compiled) = cached {
            return Ok(compiled);
        }

        let compiled = Arc::new(QueryMethod {
            parsed: parse(method)?,
        });
        log::debug!("Compiled query method {} with {} clause(s)", method, compiled.clauses().len());
        Ok(self
            .inner
            .methods
            .entry(method.to_string())
            .or_insert(compiled)
            .clone())
    }

    pub fn contains(&self, method: &str) -> bool {
        self.inner.methods.contains_key(method)
    }

    /// Number of compiled methods.
    pub fn size(&self) -> usize {
        self.inner.methods.len()
    }
}
