use crate::common::Record;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};

/// Step of the persist pipeline a listener is notified at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistPhase {
    PreEntity,
    PreRecord,
    PostRecord,
    PostEntity,
}

impl Display for PersistPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistPhase::PreEntity => write!(f, "pre-entity"),
            PersistPhase::PreRecord => write!(f, "pre-record"),
            PersistPhase::PostRecord => write!(f, "post-record"),
            PersistPhase::PostEntity => write!(f, "post-entity"),
        }
    }
}

/// Notification sent to [PersistListener]s.
///
/// Entity phases carry the entity being persisted, record phases the record
/// built from it or returned by the store. Payloads are borrowed: listeners
/// observe, they never alter what flows through the pipeline.
#[derive(Clone, Copy)]
pub enum PersistEvent<'a> {
    PreEntity(&'a dyn Any),
    PreRecord(&'a Record),
    PostRecord(&'a Record),
    PostEntity(&'a dyn Any),
}

impl<'a> PersistEvent<'a> {
    pub fn phase(&self) -> PersistPhase {
        match self {
            PersistEvent::PreEntity(_) => PersistPhase::PreEntity,
            PersistEvent::PreRecord(_) => PersistPhase::PreRecord,
            PersistEvent::PostRecord(_) => PersistPhase::PostRecord,
            PersistEvent::PostEntity(_) => PersistPhase::PostEntity,
        }
    }

    /// The entity of an entity phase, if it is a `T`.
    pub fn entity<T: Any>(&self) -> Option<&'a T> {
        match self {
            PersistEvent::PreEntity(entity) | PersistEvent::PostEntity(entity) => {
                let entity: &'a dyn Any = *entity;
                entity.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    /// The record of a record phase.
    pub fn record(&self) -> Option<&'a Record> {
        match self {
            PersistEvent::PreRecord(record) | PersistEvent::PostRecord(record) => Some(*record),
            _ => None,
        }
    }
}

impl Debug for PersistEvent<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.record() {
            Some(record) => write!(f, "{}({:?})", self.phase(), record),
            None => write!(f, "{}(entity)", self.phase()),
        }
    }
}

/// Observer of the persist pipeline.
///
/// Listeners run synchronously, in registration order, at every phase. A
/// listener error aborts the pipeline and surfaces as a `HookError`.
///
/// Any `Fn(&PersistEvent) -> anyhow::Result<()>` closure is a listener:
///
/// ```rust,ignore
/// let builder = Artemis::builder().listener(|event: &PersistEvent| {
///     if let Some(person) = event.entity::<Person>() {
///         anyhow::ensure!(!person.name.is_empty(), "name is required");
///     }
///     Ok(())
/// });
/// ```
pub trait PersistListener: Send + Sync {
    fn on_event(&self, event: &PersistEvent<'_>) -> anyhow::Result<()>;
}

impl<F> PersistListener for F
where
    F: Fn(&PersistEvent<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &PersistEvent<'_>) -> anyhow::Result<()> {
        self(event)
    }
}
