use crate::common::Record;
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::{downcast_box, Entity, EntityConverter, TypeDescriptor};
use crate::workflow::{PersistEvent, PersistListener};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// Fixed pipeline wrapped around every save and update.
///
/// The steps always run in this order:
/// 1. notify `pre-entity` with the input entity
/// 2. convert the entity to a record
/// 3. notify `pre-record` with that record
/// 4. run the caller's action on the record, normally a store write
/// 5. notify `post-record` with the record the action returned
/// 6. convert that record back to an entity
/// 7. notify `post-entity` with the new entity, which is returned
///
/// Any failure stops the pipeline where it happened. Nothing is rolled back,
/// that is up to the store.
#[derive(Clone, Default)]
pub struct PersistWorkflow {
    inner: Arc<PersistWorkflowInner>,
}

#[derive(Default)]
struct PersistWorkflowInner {
    listeners: RwLock<Vec<Arc<dyn PersistListener>>>,
}

impl PersistWorkflow {
    pub fn new() -> Self {
        PersistWorkflow::default()
    }

    pub fn with_listeners(listeners: Vec<Arc<dyn PersistListener>>) -> Self {
        PersistWorkflow {
            inner: Arc::new(PersistWorkflowInner {
                listeners: RwLock::new(listeners),
            }),
        }
    }

    /// Appends a listener, notified after every listener added before it.
    ///
    /// Registration goes through the config so it can be refused once the
    /// engine is built.
    pub(crate) fn add_listener<L: PersistListener + 'static>(&self, listener: L) {
        self.inner.listeners.write().push(Arc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Runs the pipeline for a typed entity.
    pub fn flow<T, F>(&self, converter: &EntityConverter, entity: &T, action: F) -> MappingResult<T>
    where
        T: Entity,
        F: FnOnce(Record) -> MappingResult<Record>,
    {
        let descriptor = converter.registry().describe::<T>()?;
        let result = self.flow_with(converter, &descriptor, entity, action)?;
        Ok(*downcast_box::<T>(result)?)
    }

    /// Runs the pipeline for an entity described by `descriptor`.
    pub fn flow_with<F>(
        &self,
        converter: &EntityConverter,
        descriptor: &TypeDescriptor,
        entity: &dyn Any,
        action: F,
    ) -> MappingResult<Box<dyn Any + Send>>
    where
        F: FnOnce(Record) -> MappingResult<Record>,
    {
        let record = self.prepare(converter, descriptor, entity)?;
        let record = action(record)?;
        self.complete(converter, descriptor, &record)
    }

    /// Steps 1 to 3, up to the record handed to the store.
    pub(crate) fn prepare(
        &self,
        converter: &EntityConverter,
        descriptor: &TypeDescriptor,
        entity: &dyn Any,
    ) -> MappingResult<Record> {
        self.fire(&PersistEvent::PreEntity(entity))?;
        let record = converter.to_record_with(descriptor, entity)?;
        self.fire(&PersistEvent::PreRecord(&record))?;
        Ok(record)
    }

    /// Steps 5 to 7, from the record the store returned.
    pub(crate) fn complete(
        &self,
        converter: &EntityConverter,
        descriptor: &TypeDescriptor,
        record: &Record,
    ) -> MappingResult<Box<dyn Any + Send>> {
        self.fire(&PersistEvent::PostRecord(record))?;
        let entity = converter.to_entity_with(descriptor, record)?;
        self.fire(&PersistEvent::PostEntity(&*entity))?;
        Ok(entity)
    }

    fn fire(&self, event: &PersistEvent<'_>) -> MappingResult<()> {
        let listeners = self.inner.listeners.read().clone();
        for listener in listeners {
            if let Err(err) = listener.on_event(event) {
                log::error!("Persist listener failed at {}: {}", event.phase(), err);
                return Err(MappingError::new(
                    &format!("Persist listener failed at {}: {}", event.phase(), err),
                    ErrorKind::HookError,
                ));
            }
        }
        Ok(())
    }
}
