use std::fmt::{Display, Formatter};

/// Specifies the direction for sorting query results.
///
/// # Variants
/// - `Ascending`: smallest to largest (A to Z, 0 to 9), the default
/// - `Descending`: largest to smallest (Z to A, 9 to 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Sort in ascending order
    #[default]
    Ascending,
    /// Sort in descending order
    Descending,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ASC"),
            SortOrder::Descending => write!(f, "DESC"),
        }
    }
}

/// One entry of an ordering clause: a field name and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sort {
    field: String,
    order: SortOrder,
}

impl Sort {
    pub fn new(field: &str, order: SortOrder) -> Self {
        Sort {
            field: field.to_string(),
            order,
        }
    }

    pub fn asc(field: &str) -> Self {
        Sort::new(field, SortOrder::Ascending)
    }

    pub fn desc(field: &str) -> Self {
        Sort::new(field, SortOrder::Descending)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub(crate) fn with_field(&self, field: &str) -> Self {
        Sort::new(field, self.order)
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}
