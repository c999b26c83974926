use crate::common::{Record, Value};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::{downcast_box, Entity, EntityConverter, TypeDescriptor};
use crate::query::{Condition, DeleteQuery, SelectQuery};
use crate::store::RecordManager;
use crate::workflow::PersistWorkflow;
use std::sync::Arc;
use std::time::Duration;

/// Entity-level operations over a [RecordManager].
///
/// Writes go through the [PersistWorkflow], reads convert the records the
/// store returns back into entities.
///
/// # Examples
///
/// ```rust,ignore
/// let template = artemis.template(&DatabaseQualifier::of_document())?;
/// let ada = template.insert(&Person { id: 1, name: "Ada".into(), ..Default::default() })?;
/// let found: Option<Person> = template.find_by_id::<Person>(val!(1))?;
/// ```
#[derive(Clone)]
pub struct EntityTemplate {
    inner: Arc<EntityTemplateInner>,
}

struct EntityTemplateInner {
    manager: RecordManager,
    converter: EntityConverter,
    workflow: PersistWorkflow,
}

impl EntityTemplate {
    pub fn new(manager: RecordManager, converter: EntityConverter, workflow: PersistWorkflow) -> Self {
        EntityTemplate {
            inner: Arc::new(EntityTemplateInner {
                manager,
                converter,
                workflow,
            }),
        }
    }

    pub fn manager(&self) -> &RecordManager {
        &self.inner.manager
    }

    pub fn converter(&self) -> &EntityConverter {
        &self.inner.converter
    }

    pub fn insert<T: Entity>(&self, entity: &T) -> MappingResult<T> {
        let manager = &self.inner.manager;
        self.inner
            .workflow
            .flow(&self.inner.converter, entity, |record| manager.insert(record))
    }

    /// Inserts an entity that expires once `ttl` has elapsed.
    pub fn insert_with_ttl<T: Entity>(&self, entity: &T, ttl: Duration) -> MappingResult<T> {
        let manager = &self.inner.manager;
        self.inner.workflow.flow(&self.inner.converter, entity, |record| {
            manager.insert_with_ttl(record, ttl)
        })
    }

    /// Inserts a batch, returning the stored entities in input order.
    ///
    /// Without a native bulk path every entity runs the whole workflow in turn,
    /// stopping at the first failure. With one, every entity passes the pre phases,
    /// the records are written in one call, then the post phases run in input order.
    pub fn insert_all<T: Entity>(&self, entities: &[T]) -> MappingResult<Vec<T>> {
        if !self.inner.manager.has_bulk_insert() {
            return entities.iter().map(|entity| self.insert(entity)).collect();
        }

        let descriptor = self.inner.converter.registry().describe::<T>()?;
        let records = entities
            .iter()
            .map(|entity| self.inner.workflow.prepare(&self.inner.converter, &descriptor, entity))
            .collect::<MappingResult<Vec<Record>>>()?;

        let expected = records.len();
        let stored = self.inner.manager.insert_all(records)?;
        if stored.len() != expected {
            log::error!(
                "Bulk insert of {} returned {} records for {} entities",
                descriptor.name(),
                stored.len(),
                expected
            );
            return Err(MappingError::new(
                &format!(
                    "Bulk insert of {} returned {} records for {} entities",
                    descriptor.name(),
                    stored.len(),
                    expected
                ),
                ErrorKind::StoreError,
            ));
        }

        stored
            .iter()
            .map(|record| self.complete::<T>(&descriptor, record))
            .collect()
    }

    /// Inserts every entity in turn with the same time to live.
    pub fn insert_all_with_ttl<T: Entity>(&self, entities: &[T], ttl: Duration) -> MappingResult<Vec<T>> {
        entities
            .iter()
            .map(|entity| self.insert_with_ttl(entity, ttl))
            .collect()
    }

    pub fn update<T: Entity>(&self, entity: &T) -> MappingResult<T> {
        let manager = &self.inner.manager;
        self.inner
            .workflow
            .flow(&self.inner.converter, entity, |record| manager.update(record))
    }

    /// Updates every entity in turn, stopping at the first failure.
    pub fn update_all<T: Entity>(&self, entities: &[T]) -> MappingResult<Vec<T>> {
        entities.iter().map(|entity| self.update(entity)).collect()
    }

    pub fn delete(&self, query: &DeleteQuery) -> MappingResult<()> {
        self.inner.manager.delete(query)
    }

    /// Deletes the entity of type `T` whose identifier is `id`.
    pub fn delete_by_id<T: Entity>(&self, id: Value) -> MappingResult<()> {
        let descriptor = self.inner.converter.registry().describe::<T>()?;
        let condition = id_condition(&descriptor, id)?;
        self.delete(&DeleteQuery::new(descriptor.name()).with_condition(condition))
    }

    pub fn select<T: Entity>(&self, query: &SelectQuery) -> MappingResult<Vec<T>> {
        self.inner
            .manager
            .select(query)?
            .iter()
            .map(|record| self.inner.converter.to_entity::<T>(record))
            .collect()
    }

    /// The only entity matching `query`, `None` when nothing matches.
    ///
    /// Fails with `NonUniqueResultError` when the store returns more than one record.
    pub fn single_result<T: Entity>(&self, query: &SelectQuery) -> MappingResult<Option<T>> {
        let mut records = self.inner.manager.select(query)?;
        match records.len() {
            0 => Ok(None),
            1 => {
                let record = records.remove(0);
                Ok(Some(self.inner.converter.to_entity::<T>(&record)?))
            }
            _ => {
                log::error!("The query returns more than one entity, query: {}", query);
                Err(MappingError::new(
                    &format!("The query returns more than one entity, query: {}", query),
                    ErrorKind::NonUniqueResultError,
                ))
            }
        }
    }

    pub fn find_by_id<T: Entity>(&self, id: Value) -> MappingResult<Option<T>> {
        let descriptor = self.inner.converter.registry().describe::<T>()?;
        let condition = id_condition(&descriptor, id)?;
        self.single_result(&SelectQuery::new(descriptor.name()).with_condition(condition))
    }

    /// Selects every stored entity of type `T`.
    pub fn find_all<T: Entity>(&self) -> MappingResult<Vec<T>> {
        let descriptor = self.inner.converter.registry().describe::<T>()?;
        self.select(&SelectQuery::new(descriptor.name()))
    }

    fn complete<T: Entity>(&self, descriptor: &TypeDescriptor, record: &Record) -> MappingResult<T> {
        let entity = self
            .inner
            .workflow
            .complete(&self.inner.converter, descriptor, record)?;
        Ok(*downcast_box::<T>(entity)?)
    }
}

pub(crate) fn id_condition(descriptor: &TypeDescriptor, id: Value) -> MappingResult<Condition> {
    if id.is_null() {
        log::error!("Null identifier for {}", descriptor.type_name());
        return Err(MappingError::null_argument("id"));
    }

    match descriptor.id() {
        Some(field) => Ok(Condition::eq(field.name(), id)),
        None => {
            log::error!("Type {} has no identifier field", descriptor.type_name());
            Err(MappingError::new(
                &format!("Type {} has no identifier field", descriptor.type_name()),
                ErrorKind::MappingError,
            ))
        }
    }
}
