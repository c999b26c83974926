use crate::common::{Record, Sort, Value};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::{Entity, TypeDescriptor};
use crate::query::{Condition, DeleteQuery, QueryKind, QueryMethod, SelectQuery};
use crate::repository::{EntityStream, QueryResult, RepositoryDefinition, ReturnShape};
use crate::template::EntityTemplate;
use itertools::Itertools;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Repository of entities of type `T`.
///
/// Besides the generic save and update operations, a repository answers the
/// query methods its [RepositoryDefinition] declares. Field names used in a
/// method name are program-side names; they are translated to record columns
/// before the query reaches the store.
///
/// # Examples
///
/// ```rust,ignore
/// let definition = RepositoryDefinition::new(&[("findByAgeGreaterThan", ReturnShape::List)])?;
/// let people = artemis.repository::<Person>(&DatabaseQualifier::of_document(), &definition)?;
/// people.save(&ada)?;
/// let adults = people.invoke("findByAgeGreaterThan", &[val!(17)])?.into_vec()?;
/// ```
pub struct Repository<T: Entity> {
    inner: Arc<RepositoryInner>,
    _entity: PhantomData<fn() -> T>,
}

struct RepositoryInner {
    template: EntityTemplate,
    definition: RepositoryDefinition,
    descriptor: Arc<TypeDescriptor>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            inner: self.inner.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(template: EntityTemplate, definition: RepositoryDefinition) -> MappingResult<Self> {
        let descriptor = template.converter().registry().describe::<T>()?;
        Ok(Repository {
            inner: Arc::new(RepositoryInner {
                template,
                definition,
                descriptor,
            }),
            _entity: PhantomData,
        })
    }

    pub fn definition(&self) -> &RepositoryDefinition {
        &self.inner.definition
    }

    pub fn save(&self, entity: &T) -> MappingResult<T> {
        self.inner.template.insert(entity)
    }

    pub fn save_with_ttl(&self, entity: &T, ttl: Duration) -> MappingResult<T> {
        self.inner.template.insert_with_ttl(entity, ttl)
    }

    /// Saves every entity, returning them in input order.
    pub fn save_all(&self, entities: &[T]) -> MappingResult<Vec<T>> {
        self.inner.template.insert_all(entities)
    }

    /// Saves every entity in turn, each expiring once `ttl` has elapsed.
    pub fn save_all_with_ttl(&self, entities: &[T], ttl: Duration) -> MappingResult<Vec<T>> {
        self.inner.template.insert_all_with_ttl(entities, ttl)
    }

    pub fn update(&self, entity: &T) -> MappingResult<T> {
        self.inner.template.update(entity)
    }

    pub fn update_all(&self, entities: &[T]) -> MappingResult<Vec<T>> {
        self.inner.template.update_all(entities)
    }

    pub fn find_by_id(&self, id: Value) -> MappingResult<Option<T>> {
        self.inner.template.find_by_id::<T>(id)
    }

    pub fn find_all(&self) -> MappingResult<Vec<T>> {
        self.inner.template.find_all::<T>()
    }

    pub fn delete_by_id(&self, id: Value) -> MappingResult<()> {
        self.inner.template.delete_by_id::<T>(id)
    }

    /// Runs a declared query method with positional arguments.
    ///
    /// Fails with `DynamicQueryError` for undeclared methods or missing
    /// arguments, with `NullArgument` for `Null` arguments and with
    /// `NonUniqueResultError` when a single-result shape matches more than one
    /// record.
    pub fn invoke(&self, method: &str, args: &[Value]) -> MappingResult<QueryResult<T>> {
        let binding = match self.inner.definition.method(method) {
            Some(binding) => binding,
            None => {
                log::error!("Method {} is not declared by the repository of {}", method, self.inner.descriptor.type_name());
                return Err(MappingError::new(
                    &format!(
                        "Method {} is not declared by the repository of {}",
                        method,
                        self.inner.descriptor.type_name()
                    ),
                    ErrorKind::DynamicQueryError,
                ));
            }
        };

        let query = binding.method();
        match query.kind() {
            QueryKind::Delete => {
                self.inner.template.delete(&self.delete_query(query, args)?)?;
                Ok(QueryResult::Unit)
            }
            QueryKind::Exists => {
                let select = self.select_query(query, args)?.with_limit(1);
                let found = self.inner.template.manager().select(&select)?;
                Ok(QueryResult::Boolean(!found.is_empty()))
            }
            QueryKind::Find | QueryKind::Get => {
                let select = self.select_query(query, args)?;
                self.adapt(binding.shape(), &select)
            }
        }
    }

    fn adapt(&self, shape: ReturnShape, query: &SelectQuery) -> MappingResult<QueryResult<T>> {
        let template = &self.inner.template;
        match shape {
            ReturnShape::Instance => Ok(QueryResult::Instance(template.single_result::<T>(query)?)),
            ReturnShape::Optional => Ok(QueryResult::Optional(template.single_result::<T>(query)?)),
            ReturnShape::List => Ok(QueryResult::List(template.select::<T>(query)?)),
            ReturnShape::Set => {
                let records = template.manager().select(query)?;
                let entities = records
                    .into_iter()
                    .unique()
                    .map(|record| self.to_entity(&record))
                    .collect::<MappingResult<Vec<T>>>()?;
                Ok(QueryResult::Set(entities))
            }
            ReturnShape::Stream => {
                let records = template.manager().select(query)?;
                Ok(QueryResult::Stream(EntityStream::new(
                    records,
                    template.converter().clone(),
                )))
            }
            ReturnShape::Boolean | ReturnShape::Unit => {
                log::error!("A finder cannot return {}", shape);
                Err(MappingError::new(
                    &format!("A finder cannot return {}", shape),
                    ErrorKind::IllegalStateError,
                ))
            }
        }
    }

    fn select_query(&self, method: &QueryMethod, args: &[Value]) -> MappingResult<SelectQuery> {
        let sorts = method
            .sorts()
            .iter()
            .map(|sort| sort.with_field(&self.column(sort.field())))
            .collect::<Vec<Sort>>();
        Ok(SelectQuery::new(self.inner.descriptor.name())
            .with_condition(self.condition(method, args)?)
            .with_sorts(sorts))
    }

    fn delete_query(&self, method: &QueryMethod, args: &[Value]) -> MappingResult<DeleteQuery> {
        Ok(DeleteQuery::new(self.inner.descriptor.name()).with_condition(self.condition(method, args)?))
    }

    fn condition(&self, method: &QueryMethod, args: &[Value]) -> MappingResult<Condition> {
        let condition = method.bind(args)?;
        Ok(condition.map_fields(&|field: &str| self.column(field)))
    }

    fn column(&self, field: &str) -> String {
        self.inner
            .descriptor
            .column_name(field)
            .unwrap_or_else(|| field.to_string())
    }

    fn to_entity(&self, record: &Record) -> MappingResult<T> {
        self.inner.template.converter().to_entity::<T>(record)
    }
}
