use crate::common::Record;
use crate::errors::MappingResult;
use crate::query::{DeleteQuery, SelectQuery};
use crate::store::DatabaseType;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Completion callback of an asynchronous store operation.
pub type Callback<T> = Box<dyn FnOnce(MappingResult<T>) + Send + 'static>;

/// Contract of an asynchronous store driver working on records.
///
/// Every operation returns immediately and reports its outcome exactly once
/// through the supplied callback, on whatever thread the driver chooses.
pub trait AsyncRecordManagerProvider: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    fn insert(&self, record: Record, callback: Callback<Record>);

    fn insert_with_ttl(&self, record: Record, ttl: Duration, callback: Callback<Record>);

    fn update(&self, record: Record, callback: Callback<Record>);

    fn delete(&self, query: DeleteQuery, callback: Callback<()>);

    fn select(&self, query: SelectQuery, callback: Callback<Vec<Record>>);
}

/// Shared handle to an [AsyncRecordManagerProvider].
#[derive(Clone)]
pub struct AsyncRecordManager {
    inner: Arc<dyn AsyncRecordManagerProvider>,
}

impl AsyncRecordManager {
    pub fn new<T: AsyncRecordManagerProvider + 'static>(inner: T) -> Self {
        AsyncRecordManager {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for AsyncRecordManager {
    type Target = Arc<dyn AsyncRecordManagerProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
