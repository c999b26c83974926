use crate::common::Record;
use crate::errors::MappingResult;
use crate::mapping::{Entity, EntityConverter};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Outcome of a repository query method, adapted to its declared shape.
#[derive(Debug)]
pub enum QueryResult<T> {
    /// The single match, `None` when the store replied with nothing.
    Instance(Option<T>),
    Optional(Option<T>),
    List(Vec<T>),
    /// Distinct matches, deduplicated on their stored records.
    Set(Vec<T>),
    Stream(EntityStream<T>),
    Boolean(bool),
    Unit,
}

impl<T: Entity> QueryResult<T> {
    /// The single entity of an `Instance` or `Optional` result.
    pub fn into_single(self) -> Option<T> {
        match self {
            QueryResult::Instance(entity) | QueryResult::Optional(entity) => entity,
            _ => None,
        }
    }

    /// Every entity of the result, draining a stream. Failures while
    /// converting a streamed record are returned as errors.
    pub fn into_vec(self) -> MappingResult<Vec<T>> {
        match self {
            QueryResult::Instance(entity) | QueryResult::Optional(entity) => Ok(entity.into_iter().collect()),
            QueryResult::List(entities) | QueryResult::Set(entities) => Ok(entities),
            QueryResult::Stream(stream) => stream.collect(),
            QueryResult::Boolean(_) | QueryResult::Unit => Ok(Vec::new()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryResult::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, QueryResult::Unit)
    }
}

/// Finite sequence of entities converted from store records on demand.
pub struct EntityStream<T> {
    records: std::vec::IntoIter<Record>,
    converter: EntityConverter,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityStream<T> {
    pub(crate) fn new(records: Vec<Record>, converter: EntityConverter) -> Self {
        EntityStream {
            records: records.into_iter(),
            converter,
            _entity: PhantomData,
        }
    }

    /// Records not yet converted.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl<T: Entity> Iterator for EntityStream<T> {
    type Item = MappingResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(self.converter.to_entity::<T>(&record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<T> Debug for EntityStream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStream")
            .field("remaining", &self.records.len())
            .finish()
    }
}
