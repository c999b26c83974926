use crate::common::Sort;
use crate::query::Condition;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A read request handed to a record manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    name: String,
    condition: Option<Condition>,
    sorts: Vec<Sort>,
    limit: Option<usize>,
}

impl SelectQuery {
    /// Selects every record named `name`.
    pub fn new(name: &str) -> Self {
        SelectQuery {
            name: name.to_string(),
            condition: None,
            sorts: Vec::new(),
            limit: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_sorts(mut self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.sorts.extend(sorts);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl Display for SelectQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "select from {}", self.name)?;
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        if !self.sorts.is_empty() {
            write!(f, " order by {}", self.sorts.iter().join(", "))?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}

/// A delete request handed to a record manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteQuery {
    name: String,
    condition: Option<Condition>,
}

impl DeleteQuery {
    /// Deletes every record named `name`.
    pub fn new(name: &str) -> Self {
        DeleteQuery {
            name: name.to_string(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

impl Display for DeleteQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "delete from {}", self.name)?;
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        Ok(())
    }
}
