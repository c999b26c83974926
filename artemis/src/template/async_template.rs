use crate::common::Record;
use crate::errors::MappingResult;
use crate::mapping::{downcast_box, Entity, EntityConverter, TypeDescriptor};
use crate::query::{DeleteQuery, SelectQuery};
use crate::store::{AsyncRecordManager, Callback};
use crate::workflow::PersistWorkflow;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PENDING: u8 = 0;
const CANCELLED: u8 = 1;
const COMPLETED: u8 = 2;

/// Handle on an operation submitted to an [AsyncEntityTemplate].
///
/// Cancelling only stops the template from reporting: the store may still
/// apply the write, but the post phases of the workflow and the caller's
/// callback are skipped.
#[derive(Clone)]
pub struct PendingOperation {
    state: Arc<AtomicU8>,
}

impl PendingOperation {
    fn new() -> Self {
        PendingOperation {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Requests cancellation. Returns `false` when the operation already completed.
    pub fn cancel(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(state) => state == CANCELLED,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    pub fn is_completed(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETED
    }

    fn try_complete(&self) -> bool {
        self.state
            .compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Debug for PendingOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.load(Ordering::Acquire) {
            CANCELLED => "cancelled",
            COMPLETED => "completed",
            _ => "pending",
        };
        f.debug_struct("PendingOperation").field("state", &state).finish()
    }
}

/// Entity-level operations over an [AsyncRecordManager].
///
/// The pre phases of the [PersistWorkflow] run on the caller's thread, so a
/// failing listener or conversion is reported synchronously. Everything after
/// the store call runs wherever the store completes and ends in the callback.
#[derive(Clone)]
pub struct AsyncEntityTemplate {
    inner: Arc<AsyncEntityTemplateInner>,
}

struct AsyncEntityTemplateInner {
    manager: AsyncRecordManager,
    converter: EntityConverter,
    workflow: PersistWorkflow,
}

impl AsyncEntityTemplate {
    pub fn new(manager: AsyncRecordManager, converter: EntityConverter, workflow: PersistWorkflow) -> Self {
        AsyncEntityTemplate {
            inner: Arc::new(AsyncEntityTemplateInner {
                manager,
                converter,
                workflow,
            }),
        }
    }

    pub fn manager(&self) -> &AsyncRecordManager {
        &self.inner.manager
    }

    pub fn insert<T, C>(&self, entity: &T, callback: C) -> MappingResult<PendingOperation>
    where
        T: Entity,
        C: FnOnce(MappingResult<T>) + Send + 'static,
    {
        let (record, descriptor) = self.prepare(entity)?;
        let pending = PendingOperation::new();
        let completion = self.entity_completion(descriptor, pending.clone(), callback);
        self.inner.manager.insert(record, completion);
        Ok(pending)
    }

    pub fn insert_with_ttl<T, C>(&self, entity: &T, ttl: Duration, callback: C) -> MappingResult<PendingOperation>
    where
        T: Entity,
        C: FnOnce(MappingResult<T>) + Send + 'static,
    {
        let (record, descriptor) = self.prepare(entity)?;
        let pending = PendingOperation::new();
        let completion = self.entity_completion(descriptor, pending.clone(), callback);
        self.inner.manager.insert_with_ttl(record, ttl, completion);
        Ok(pending)
    }

    pub fn update<T, C>(&self, entity: &T, callback: C) -> MappingResult<PendingOperation>
    where
        T: Entity,
        C: FnOnce(MappingResult<T>) + Send + 'static,
    {
        let (record, descriptor) = self.prepare(entity)?;
        let pending = PendingOperation::new();
        let completion = self.entity_completion(descriptor, pending.clone(), callback);
        self.inner.manager.update(record, completion);
        Ok(pending)
    }

    pub fn delete<C>(&self, query: DeleteQuery, callback: C) -> PendingOperation
    where
        C: FnOnce(MappingResult<()>) + Send + 'static,
    {
        let pending = PendingOperation::new();
        let handle = pending.clone();
        let description = query.to_string();
        self.inner.manager.delete(
            query,
            Box::new(move |result| {
                if !handle.try_complete() {
                    log::warn!("Dropping result of cancelled operation: {}", description);
                    return;
                }
                callback(result);
            }),
        );
        pending
    }

    pub fn select<T, C>(&self, query: SelectQuery, callback: C) -> PendingOperation
    where
        T: Entity,
        C: FnOnce(MappingResult<Vec<T>>) + Send + 'static,
    {
        let pending = PendingOperation::new();
        let handle = pending.clone();
        let converter = self.inner.converter.clone();
        let description = query.to_string();
        self.inner.manager.select(
            query,
            Box::new(move |result| {
                if !handle.try_complete() {
                    log::warn!("Dropping result of cancelled operation: {}", description);
                    return;
                }
                let entities = result.and_then(|records| {
                    records
                        .iter()
                        .map(|record| converter.to_entity::<T>(record))
                        .collect()
                });
                callback(entities);
            }),
        );
        pending
    }

    fn prepare<T: Entity>(&self, entity: &T) -> MappingResult<(Record, Arc<TypeDescriptor>)> {
        let descriptor = self.inner.converter.registry().describe::<T>()?;
        let record = self
            .inner
            .workflow
            .prepare(&self.inner.converter, &descriptor, entity)?;
        Ok((record, descriptor))
    }

    fn entity_completion<T, C>(
        &self,
        descriptor: Arc<TypeDescriptor>,
        pending: PendingOperation,
        callback: C,
    ) -> Callback<Record>
    where
        T: Entity,
        C: FnOnce(MappingResult<T>) + Send + 'static,
    {
        let converter = self.inner.converter.clone();
        let workflow = self.inner.workflow.clone();
        Box::new(move |result: MappingResult<Record>| {
            if !pending.try_complete() {
                log::warn!("Dropping result of cancelled {} write", descriptor.type_name());
                return;
            }
            let entity = result
                .and_then(|record| workflow.complete(&converter, &descriptor, &record))
                .and_then(downcast_box::<T>)
                .map(|entity| *entity);
            callback(entity);
        })
    }
}
