use crate::artemis_builder::ArtemisBuilder;
use crate::artemis_config::ArtemisConfig;
use crate::errors::MappingResult;
use crate::mapping::{Entity, EntityConverter, MetadataRegistry};
use crate::repository::{Repository, RepositoryDefinition};
use crate::store::DatabaseQualifier;
use crate::template::{AsyncEntityTemplate, EntityTemplate};
use crate::workflow::PersistWorkflow;
use std::sync::Arc;

/// The assembled mapping engine.
///
/// `Artemis` hands out templates and repositories bound to the store drivers
/// of its [ArtemisConfig]. All of them share one converter, one metadata
/// registry and one persist workflow.
///
/// Cloning is cheap, every clone shares the same state.
///
/// # Examples
///
/// ```rust,ignore
/// let artemis = Artemis::builder()
///     .manager(DatabaseQualifier::of_document(), RecordManager::new(driver))
///     .build()?;
///
/// let template = artemis.template(&DatabaseQualifier::of_document())?;
/// template.insert(&ada)?;
/// ```
#[derive(Clone)]
pub struct Artemis {
    inner: Arc<ArtemisInner>,
}

struct ArtemisInner {
    config: ArtemisConfig,
    converter: EntityConverter,
}

impl Artemis {
    pub fn builder() -> ArtemisBuilder {
        ArtemisBuilder::new()
    }

    pub(crate) fn new(config: ArtemisConfig) -> Self {
        let converter = EntityConverter::new(config.registry());
        Artemis {
            inner: Arc::new(ArtemisInner { config, converter }),
        }
    }

    pub fn config(&self) -> &ArtemisConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &MetadataRegistry {
        self.inner.converter.registry()
    }

    pub fn converter(&self) -> &EntityConverter {
        &self.inner.converter
    }

    pub fn workflow(&self) -> PersistWorkflow {
        self.inner.config.workflow()
    }

    /// Template over the synchronous driver bound to `qualifier`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalStateError` when no driver is bound to the qualifier.
    pub fn template(&self, qualifier: &DatabaseQualifier) -> MappingResult<EntityTemplate> {
        let manager = self.inner.config.manager(qualifier)?;
        Ok(EntityTemplate::new(
            manager,
            self.inner.converter.clone(),
            self.workflow(),
        ))
    }

    /// Template over the asynchronous driver bound to `qualifier`.
    pub fn async_template(&self, qualifier: &DatabaseQualifier) -> MappingResult<AsyncEntityTemplate> {
        let manager = self.inner.config.async_manager(qualifier)?;
        Ok(AsyncEntityTemplate::new(
            manager,
            self.inner.converter.clone(),
            self.workflow(),
        ))
    }

    /// Repository of `T` answering the methods of `definition`.
    pub fn repository<T: Entity>(
        &self,
        qualifier: &DatabaseQualifier,
        definition: &RepositoryDefinition,
    ) -> MappingResult<Repository<T>> {
        Repository::new(self.template(qualifier)?, definition.clone())
    }
}
