use crate::common::Record;
use crate::errors::MappingResult;
use crate::query::{DeleteQuery, SelectQuery};
use crate::store::DatabaseType;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

/// Contract of a synchronous store driver working on records.
///
/// # Purpose
/// The mapping layer never talks to a storage engine itself. Templates and
/// repositories convert entities to records and hand them to a record manager,
/// which owns persistence, identity and consistency.
///
/// # Key Responsibilities
/// - **Writes**: insert, insert with a time to live, update
/// - **Reads**: select records matching a [SelectQuery]
/// - **Deletes**: remove records matching a [DeleteQuery]
/// - **Bulk path**: optionally insert a batch natively
///
/// Write operations return the record as stored, which may carry entries the
/// store injected.
pub trait RecordManagerProvider: Send + Sync {
    /// The store family this manager serves.
    fn database_type(&self) -> DatabaseType;

    fn insert(&self, record: Record) -> MappingResult<Record>;

    /// Inserts a record that expires once `ttl` has elapsed.
    fn insert_with_ttl(&self, record: Record, ttl: Duration) -> MappingResult<Record>;

    /// Whether the store inserts a batch natively through
    /// [insert_all](Self::insert_all). Without it callers save element by element.
    fn has_bulk_insert(&self) -> bool {
        false
    }

    /// Inserts a batch, returning one stored record per input record, in input order.
    fn insert_all(&self, records: Vec<Record>) -> MappingResult<Vec<Record>> {
        records.into_iter().map(|record| self.insert(record)).collect()
    }

    fn update(&self, record: Record) -> MappingResult<Record>;

    fn delete(&self, query: &DeleteQuery) -> MappingResult<()>;

    /// Records matching the query, in store reply order.
    fn select(&self, query: &SelectQuery) -> MappingResult<Vec<Record>>;
}

/// Shared handle to a [RecordManagerProvider].
///
/// Cloning is cheap, every clone talks to the same driver.
#[derive(Clone)]
pub struct RecordManager {
    inner: Arc<dyn RecordManagerProvider>,
}

impl RecordManager {
    pub fn new<T: RecordManagerProvider + 'static>(inner: T) -> Self {
        RecordManager {
            inner: Arc::new(inner),
        }
    }
}

impl std::fmt::Debug for RecordManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordManager")
            .field("database_type", &self.inner.database_type())
            .finish()
    }
}

impl Deref for RecordManager {
    type Target = Arc<dyn RecordManagerProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
