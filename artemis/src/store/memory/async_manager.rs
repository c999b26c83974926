use crate::common::Record;
use crate::errors::MappingResult;
use crate::query::{DeleteQuery, SelectQuery};
use crate::store::memory::MemoryRecordManager;
use crate::store::{AsyncRecordManagerProvider, Callback, DatabaseType, RecordManagerProvider};
use std::thread;
use std::time::Duration;

/// Asynchronous facade over a [MemoryRecordManager].
///
/// Each operation runs on its own thread and reports through its callback. An
/// optional delay before every operation makes in-flight states observable in
/// tests.
#[derive(Clone)]
pub struct MemoryAsyncRecordManager {
    manager: MemoryRecordManager,
    delay: Option<Duration>,
}

impl MemoryAsyncRecordManager {
    pub fn new(database_type: DatabaseType) -> Self {
        MemoryAsyncRecordManager::from_manager(MemoryRecordManager::new(database_type))
    }

    /// Shares the tables of an existing synchronous manager.
    pub fn from_manager(manager: MemoryRecordManager) -> Self {
        MemoryAsyncRecordManager {
            manager,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn manager(&self) -> &MemoryRecordManager {
        &self.manager
    }

    fn run<T, F>(&self, operation: F, callback: Callback<T>)
    where
        T: Send + 'static,
        F: FnOnce(&MemoryRecordManager) -> MappingResult<T> + Send + 'static,
    {
        let manager = self.manager.clone();
        let delay = self.delay;
        thread::spawn(move || {
            if let Some(delay) = delay {
                thread::sleep(delay);
            }
            callback(operation(&manager));
        });
    }
}

impl AsyncRecordManagerProvider for MemoryAsyncRecordManager {
    fn database_type(&self) -> DatabaseType {
        self.manager.database_type()
    }

    fn insert(&self, record: Record, callback: Callback<Record>) {
        self.run(move |manager| manager.insert(record), callback);
    }

    fn insert_with_ttl(&self, record: Record, ttl: Duration, callback: Callback<Record>) {
        self.run(move |manager| manager.insert_with_ttl(record, ttl), callback);
    }

    fn update(&self, record: Record, callback: Callback<Record>) {
        self.run(move |manager| manager.update(record), callback);
    }

    fn delete(&self, query: DeleteQuery, callback: Callback<()>) {
        self.run(move |manager| manager.delete(&query), callback);
    }

    fn select(&self, query: SelectQuery, callback: Callback<Vec<Record>>) {
        self.run(move |manager| manager.select(&query), callback);
    }
}
