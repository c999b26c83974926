use crate::common::{Record, SortOrder, Value, DEFAULT_ID_NAME};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::query::{DeleteQuery, SelectQuery};
use crate::store::{DatabaseType, RecordManagerProvider};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

struct StoredRecord {
    record: Record,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// In-memory record manager.
///
/// # Purpose
/// A reference driver for tests and prototypes. Records are grouped by record
/// name and kept in insertion order. All data is lost when the last clone is
/// dropped.
///
/// # Characteristics
/// - **Keyed**: every record is identified by its key entry, `_id` unless
///   [with_key](MemoryRecordManager::with_key) names another column for a record
///   name; inserting an existing key replaces the stored record in place
/// - **Queryable**: conditions are evaluated with `Condition::test`, sorts and
///   limits are applied after filtering
/// - **Expiring**: records inserted with a time to live disappear from every
///   read once it has elapsed
/// - **Bulk aware**: batches go through a native bulk path unless disabled with
///   [without_bulk](MemoryRecordManager::without_bulk)
/// - **Thread safe**: clones share the same tables
#[derive(Clone)]
pub struct MemoryRecordManager {
    inner: Arc<MemoryRecordManagerInner>,
    bulk: bool,
}

struct MemoryRecordManagerInner {
    database_type: DatabaseType,
    keys: DashMap<String, String>,
    tables: DashMap<String, Vec<StoredRecord>>,
    bulk_inserts: AtomicUsize,
}

impl MemoryRecordManager {
    pub fn new(database_type: DatabaseType) -> Self {
        MemoryRecordManager {
            inner: Arc::new(MemoryRecordManagerInner {
                database_type,
                keys: DashMap::new(),
                tables: DashMap::new(),
                bulk_inserts: AtomicUsize::new(0),
            }),
            bulk: true,
        }
    }

    /// Identifies records named `name` by `column` instead of `_id`.
    pub fn with_key(self, name: &str, column: &str) -> Self {
        self.inner.keys.insert(name.to_string(), column.to_string());
        self
    }

    /// Disables the native bulk insert path.
    pub fn without_bulk(mut self) -> Self {
        self.bulk = false;
        self
    }

    /// Number of live records named `name`.
    pub fn count(&self, name: &str) -> usize {
        let now = Utc::now();
        self.inner
            .tables
            .get(name)
            .map(|table| table.iter().filter(|s| !s.is_expired(now)).count())
            .unwrap_or(0)
    }

    /// Number of batches that went through the native bulk path.
    pub fn bulk_inserts(&self) -> usize {
        self.inner.bulk_inserts.load(AtomicOrdering::Relaxed)
    }

    pub fn clear(&self) {
        self.inner.tables.clear();
    }

    fn key_column(&self, name: &str) -> String {
        self.inner
            .keys
            .get(name)
            .map(|it| it.value().clone())
            .unwrap_or_else(|| DEFAULT_ID_NAME.to_string())
    }

    fn store(&self, record: Record, expires_at: Option<DateTime<Utc>>) -> MappingResult<Record> {
        let column = self.key_column(record.name());
        let key = record.find(&column).cloned();
        let now = Utc::now();

        let mut table = self.inner.tables.entry(record.name().to_string()).or_default();
        table.retain(|stored| !stored.is_expired(now));

        let stored = StoredRecord {
            record: record.clone(),
            expires_at,
        };
        match key.and_then(|key| position(&table, &column, &key)) {
            Some(index) => table[index] = stored,
            None => table.push(stored),
        }
        Ok(record)
    }
}

fn position(table: &[StoredRecord], column: &str, key: &Value) -> Option<usize> {
    table
        .iter()
        .position(|stored| stored.record.find(column) == Some(key))
}

fn compare(a: &Record, b: &Record, query: &SelectQuery) -> Ordering {
    for sort in query.sorts() {
        let ordering = a.find_path(sort.field()).cmp(&b.find_path(sort.field()));
        let ordering = match sort.order() {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl RecordManagerProvider for MemoryRecordManager {
    fn database_type(&self) -> DatabaseType {
        self.inner.database_type
    }

    fn insert(&self, record: Record) -> MappingResult<Record> {
        self.store(record, None)
    }

    fn insert_with_ttl(&self, record: Record, ttl: Duration) -> MappingResult<Record> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|err| {
            log::error!("Invalid time to live for {}: {}", record.name(), err);
            MappingError::new(&format!("Invalid time to live: {}", err), ErrorKind::StoreError)
        })?;
        self.store(record, Some(Utc::now() + ttl))
    }

    fn has_bulk_insert(&self) -> bool {
        self.bulk
    }

    fn insert_all(&self, records: Vec<Record>) -> MappingResult<Vec<Record>> {
        self.inner.bulk_inserts.fetch_add(1, AtomicOrdering::Relaxed);
        records.into_iter().map(|record| self.insert(record)).collect()
    }

    fn update(&self, record: Record) -> MappingResult<Record> {
        let column = self.key_column(record.name());
        let Some(key) = record.find(&column).cloned() else {
            log::error!("Record {} has no key entry {}", record.name(), column);
            return Err(MappingError::new(
                &format!("Record {} has no key entry {}", record.name(), column),
                ErrorKind::StoreError,
            ));
        };

        let now = Utc::now();
        let mut table = self.inner.tables.entry(record.name().to_string()).or_default();
        table.retain(|stored| !stored.is_expired(now));
        match position(&table, &column, &key) {
            Some(index) => {
                table[index].record = record.clone();
                Ok(record)
            }
            None => {
                log::error!("No record {} with {} {}", record.name(), column, key);
                Err(MappingError::new(
                    &format!("No record {} with {} {}", record.name(), column, key),
                    ErrorKind::StoreError,
                ))
            }
        }
    }

    fn delete(&self, query: &DeleteQuery) -> MappingResult<()> {
        let Some(mut table) = self.inner.tables.get_mut(query.name()) else {
            return Ok(());
        };

        let now = Utc::now();
        let matched = table
            .iter()
            .map(|stored| match query.condition() {
                Some(condition) => condition.test(&stored.record),
                None => Ok(true),
            })
            .collect::<MappingResult<Vec<bool>>>()?;

        let mut matched = matched.into_iter();
        table.retain(|stored| {
            let deleted = matched.next().unwrap_or(false);
            !deleted && !stored.is_expired(now)
        });
        Ok(())
    }

    fn select(&self, query: &SelectQuery) -> MappingResult<Vec<Record>> {
        let now = Utc::now();
        let mut records = Vec::new();
        if let Some(table) = self.inner.tables.get(query.name()) {
            for stored in table.iter().filter(|s| !s.is_expired(now)) {
                let matched = match query.condition() {
                    Some(condition) => condition.test(&stored.record)?,
                    None => true,
                };
                if matched {
                    records.push(stored.record.clone());
                }
            }
        }

        if !query.sorts().is_empty() {
            records.sort_by(|a, b| compare(a, b, query));
        }
        if let Some(limit) = query.limit() {
            records.truncate(limit);
        }
        Ok(records)
    }
}
