use crate::mapping::{FieldDeclaration, FieldShape};
use std::fmt::{Display, Formatter};

/// Role of a field in its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single value stored under the field's name
    Plain,
    /// A homogeneous sequence stored as an array
    Collection,
    /// A key to value mapping stored as a map
    Map,
    /// A nested entity stored as a child record under the field's name
    Embedded,
    /// A nested entity whose entries are spliced into the parent record
    SubEntity,
}

impl FieldKind {
    pub fn is_nested(&self) -> bool {
        matches!(self, FieldKind::Embedded | FieldKind::SubEntity)
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Plain => write!(f, "PLAIN"),
            FieldKind::Collection => write!(f, "COLLECTION"),
            FieldKind::Map => write!(f, "MAP"),
            FieldKind::Embedded => write!(f, "EMBEDDED"),
            FieldKind::SubEntity => write!(f, "SUBENTITY"),
        }
    }
}

/// Decides the role of a declared field from static information only.
///
/// Containers keep their container role even when they carry the identifier
/// marker. A nested entity is `EMBEDDED` when its own type is marked embeddable
/// and `SUBENTITY` otherwise. Everything else is `PLAIN`.
pub fn classify(field: &FieldDeclaration) -> FieldKind {
    match field.shape() {
        FieldShape::Sequence(_) => FieldKind::Collection,
        FieldShape::Mapping(_) => FieldKind::Map,
        FieldShape::Nested(access) => {
            if (access.declare)().is_embeddable() {
                FieldKind::Embedded
            } else {
                FieldKind::SubEntity
            }
        }
        FieldShape::Scalar(_) => FieldKind::Plain,
    }
}
