//! Configuration of an [Artemis](crate::artemis::Artemis) engine.

use crate::common::{ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::MetadataRegistry;
use crate::store::{AsyncRecordManager, DatabaseQualifier, DatabaseType, RecordManager};
use crate::workflow::{PersistListener, PersistWorkflow};
use crate::FIELD_SEPARATOR;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Settings and store bindings shared by everything an engine hands out.
///
/// A configuration is mutable until the engine is built, after which every
/// setter fails with `IllegalStateError`.
///
/// # Examples
///
/// ```rust,ignore
/// let config = ArtemisConfig::new();
/// config.set_field_separator(":")?;
/// config.bind_manager(DatabaseQualifier::of_document(), RecordManager::new(driver))?;
/// ```
#[derive(Clone)]
pub struct ArtemisConfig {
    inner: Arc<ArtemisConfigInner>,
}

impl Default for ArtemisConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtemisConfig {
    pub fn new() -> Self {
        ArtemisConfig {
            inner: Arc::new(ArtemisConfigInner::new()),
        }
    }

    /// Separator between the segments of a nested column path.
    pub fn field_separator(&self) -> String {
        self.inner.field_separator()
    }

    /// Sets the separator of nested column paths.
    ///
    /// # Errors
    ///
    /// Returns error if already configured or if separator is empty.
    pub fn set_field_separator(&self, separator: &str) -> MappingResult<()> {
        self.inner.set_field_separator(separator)
    }

    pub fn registry(&self) -> MetadataRegistry {
        self.inner.registry()
    }

    /// Replaces the process-wide registry with a private one.
    pub fn set_registry(&self, registry: MetadataRegistry) -> MappingResult<()> {
        self.inner.set_registry(registry)
    }

    /// The persist workflow, with the listeners added so far.
    pub fn workflow(&self) -> PersistWorkflow {
        self.inner.workflow.clone()
    }

    pub fn add_listener<L: PersistListener + 'static>(&self, listener: L) -> MappingResult<()> {
        self.inner.add_listener(listener)
    }

    /// Binds a synchronous store driver to a qualifier.
    ///
    /// # Errors
    ///
    /// Returns `IllegalStateError` if already configured or if the driver
    /// serves another database type than the qualifier names.
    pub fn bind_manager(&self, qualifier: DatabaseQualifier, manager: RecordManager) -> MappingResult<()> {
        self.inner.bind_manager(qualifier, manager)
    }

    /// Binds an asynchronous store driver to a qualifier.
    pub fn bind_async_manager(&self, qualifier: DatabaseQualifier, manager: AsyncRecordManager) -> MappingResult<()> {
        self.inner.bind_async_manager(qualifier, manager)
    }

    pub fn manager(&self, qualifier: &DatabaseQualifier) -> MappingResult<RecordManager> {
        self.inner.manager(qualifier)
    }

    pub fn async_manager(&self, qualifier: &DatabaseQualifier) -> MappingResult<AsyncRecordManager> {
        self.inner.async_manager(qualifier)
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the configuration.
    pub(crate) fn initialize(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }
}

struct ArtemisConfigInner {
    configured: AtomicBool,
    registry: RwLock<MetadataRegistry>,
    workflow: PersistWorkflow,
    managers: DashMap<DatabaseQualifier, RecordManager>,
    async_managers: DashMap<DatabaseQualifier, AsyncRecordManager>,
}

impl ArtemisConfigInner {
    fn new() -> Self {
        ArtemisConfigInner {
            configured: AtomicBool::from(false),
            registry: RwLock::new(MetadataRegistry::global()),
            workflow: PersistWorkflow::new(),
            managers: DashMap::new(),
            async_managers: DashMap::new(),
        }
    }

    fn field_separator(&self) -> String {
        FIELD_SEPARATOR.read_with(|it| it.clone())
    }

    fn set_field_separator(&self, separator: &str) -> MappingResult<()> {
        self.ensure_open("Field separator cannot be changed after initialization")?;

        if separator.is_empty() {
            log::error!("Field separator cannot be empty");
            return Err(MappingError::new(
                "Field separator cannot be empty",
                ErrorKind::IllegalStateError,
            ));
        }

        FIELD_SEPARATOR.write_with(|it| *it = separator.to_string());
        Ok(())
    }

    fn registry(&self) -> MetadataRegistry {
        self.registry.read().clone()
    }

    fn set_registry(&self, registry: MetadataRegistry) -> MappingResult<()> {
        self.ensure_open("Registry cannot be changed after initialization")?;
        *self.registry.write() = registry;
        Ok(())
    }

    fn add_listener<L: PersistListener + 'static>(&self, listener: L) -> MappingResult<()> {
        self.ensure_open("Cannot add listener after initialization")?;
        self.workflow.add_listener(listener);
        Ok(())
    }

    fn bind_manager(&self, qualifier: DatabaseQualifier, manager: RecordManager) -> MappingResult<()> {
        self.ensure_open("Cannot bind a RecordManager after initialization")?;
        check_type(&qualifier, manager.database_type(), "RecordManager")?;
        self.managers.insert(qualifier, manager);
        Ok(())
    }

    fn bind_async_manager(&self, qualifier: DatabaseQualifier, manager: AsyncRecordManager) -> MappingResult<()> {
        self.ensure_open("Cannot bind an AsyncRecordManager after initialization")?;
        check_type(&qualifier, manager.database_type(), "AsyncRecordManager")?;
        self.async_managers.insert(qualifier, manager);
        Ok(())
    }

    fn manager(&self, qualifier: &DatabaseQualifier) -> MappingResult<RecordManager> {
        match self.managers.get(qualifier) {
            Some(manager) => Ok(manager.value().clone()),
            None => {
                log::error!("No RecordManager is bound to {}", qualifier);
                Err(MappingError::new(
                    &format!("No RecordManager is bound to {}", qualifier),
                    ErrorKind::IllegalStateError,
                ))
            }
        }
    }

    fn async_manager(&self, qualifier: &DatabaseQualifier) -> MappingResult<AsyncRecordManager> {
        match self.async_managers.get(qualifier) {
            Some(manager) => Ok(manager.value().clone()),
            None => {
                log::error!("No AsyncRecordManager is bound to {}", qualifier);
                Err(MappingError::new(
                    &format!("No AsyncRecordManager is bound to {}", qualifier),
                    ErrorKind::IllegalStateError,
                ))
            }
        }
    }

    fn ensure_open(&self, message: &str) -> MappingResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{}", message);
            return Err(MappingError::new(message, ErrorKind::IllegalStateError));
        }
        Ok(())
    }
}

fn check_type(
    qualifier: &DatabaseQualifier,
    actual: DatabaseType,
    manager: &str,
) -> MappingResult<()> {
    if actual != qualifier.database_type() {
        log::error!(
            "The {} must produce {} with {} type",
            qualifier.provider(),
            manager,
            qualifier.database_type()
        );
        return Err(MappingError::new(
            &format!(
                "The {} must produce {} with {} type",
                qualifier.provider(),
                manager,
                qualifier.database_type()
            ),
            ErrorKind::IllegalStateError,
        ));
    }
    Ok(())
}
