use crate::artemis::Artemis;
use crate::artemis_config::ArtemisConfig;
use crate::common::ARTEMIS_VERSION;
use crate::errors::{MappingError, MappingResult};
use crate::mapping::MetadataRegistry;
use crate::store::{AsyncRecordManager, DatabaseQualifier, RecordManager};
use crate::workflow::PersistListener;

/// Builder for an [Artemis] engine.
///
/// Errors raised while configuring are captured and returned by [build](Self::build),
/// so calls can be chained freely.
///
/// # Examples
///
/// ```rust,ignore
/// let artemis = Artemis::builder()
///     .field_separator(".")
///     .manager(DatabaseQualifier::of_document(), RecordManager::new(driver))
///     .listener(audit)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ArtemisBuilder {
    error: Option<MappingError>,
    config: ArtemisConfig,
}

impl ArtemisBuilder {
    pub fn new() -> Self {
        ArtemisBuilder {
            error: None,
            config: ArtemisConfig::new(),
        }
    }

    /// Sets the separator of nested column paths, `.` by default.
    ///
    /// An empty separator is captured as an error and returned by `build()`.
    pub fn field_separator(self, field_separator: &str) -> Self {
        self.capture(|config| config.set_field_separator(field_separator))
    }

    /// Uses a private metadata registry instead of the process-wide one.
    pub fn registry(self, registry: MetadataRegistry) -> Self {
        self.capture(|config| config.set_registry(registry))
    }

    /// Appends a persist listener. Listeners are notified in the order added.
    pub fn listener<L: PersistListener + 'static>(self, listener: L) -> Self {
        self.capture(|config| config.add_listener(listener))
    }

    /// Binds a synchronous store driver. A driver of another database type
    /// than the qualifier is captured as an `IllegalStateError`.
    pub fn manager(self, qualifier: DatabaseQualifier, manager: RecordManager) -> Self {
        self.capture(|config| config.bind_manager(qualifier, manager))
    }

    pub fn async_manager(self, qualifier: DatabaseQualifier, manager: AsyncRecordManager) -> Self {
        self.capture(|config| config.bind_async_manager(qualifier, manager))
    }

    /// Freezes the configuration and assembles the engine.
    pub fn build(self) -> MappingResult<Artemis> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize();
        log::debug!("Artemis {} initialized", ARTEMIS_VERSION);
        Ok(Artemis::new(self.config))
    }

    fn capture<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&ArtemisConfig) -> MappingResult<()>,
    {
        if self.error.is_none() {
            if let Err(e) = step(&self.config) {
                self.error = Some(e);
            }
        }
        self
    }
}
