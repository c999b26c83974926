use crate::common::{ReadExecutor, Record, DEFAULT_ID_NAME};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::{
    classify, AttributeConverter, Declare, Entity, Factory, FieldDeclaration, FieldKind,
    FieldShape, NestedAccess, TypeDeclaration, ValueAccess,
};
use crate::FIELD_SEPARATOR;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock};

static GLOBAL_REGISTRY: LazyLock<MetadataRegistry> = LazyLock::new(MetadataRegistry::new);

/// Validated, classified and immutable description of a mapped type.
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    name: String,
    fields: Vec<FieldDescriptor>,
    id: Option<usize>,
    factory: Factory,
}

impl TypeDescriptor {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Logical name, also the name of the records built for this type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The identifier field, when one is declared.
    pub fn id(&self) -> Option<&FieldDescriptor> {
        self.id.map(|index| &self.fields[index])
    }

    /// Looks a field up by its program-side name.
    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Looks a field up by its record-side name.
    pub fn field_by_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == column)
    }

    pub fn new_instance(&self) -> Box<dyn Any + Send> {
        (self.factory)()
    }

    /// Maps a program-side field path to its record-side column path.
    ///
    /// Embedded fields prefix their nested columns with their own column name and
    /// the field separator, sub-entity fields contribute their columns unprefixed,
    /// and columns of a sub-entity are also reachable by their bare field name.
    /// Returns `None` for a path that names no field.
    pub fn column_name(&self, path: &str) -> Option<String> {
        let separator = FIELD_SEPARATOR.read_with(|it| it.clone());
        let (head, rest) = match path.split_once(separator.as_str()) {
            Some((head, rest)) if !separator.is_empty() => (head, Some(rest)),
            _ => (path, None),
        };

        match self.field(head) {
            Some(field) => match (field.kind, rest, field.nested()) {
                (_, None, _) => Some(field.name.clone()),
                (FieldKind::Embedded, Some(rest), Some(nested)) => nested
                    .column_name(rest)
                    .map(|column| format!("{}{}{}", field.name, separator, column)),
                (FieldKind::SubEntity, Some(rest), Some(nested)) => nested.column_name(rest),
                _ => None,
            },
            None => self
                .fields
                .iter()
                .filter(|f| f.kind == FieldKind::SubEntity)
                .filter_map(|f| f.nested())
                .find_map(|nested| nested.column_name(path)),
        }
    }

    /// Whether any entry of `record` at this level belongs to this type.
    pub(crate) fn matches(&self, record: &Record) -> bool {
        self.fields.iter().any(|field| {
            record.contains(&field.name)
                || (field.kind.is_nested()
                    && field.nested().map(|n| n.matches(record)).unwrap_or(false))
        })
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// How the converter reaches a field's value.
#[derive(Clone, Copy)]
pub enum FieldAccess {
    Value(ValueAccess),
    Nested(NestedAccess),
}

/// A classified field of a [TypeDescriptor].
pub struct FieldDescriptor {
    field_name: &'static str,
    name: String,
    kind: FieldKind,
    is_id: bool,
    converter: Option<Arc<dyn AttributeConverter>>,
    access: FieldAccess,
    nested: Option<Arc<TypeDescriptor>>,
}

impl FieldDescriptor {
    /// Program-side name of the field.
    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    /// Record-side name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_id(&self) -> bool {
        self.is_id
    }

    pub fn converter(&self) -> Option<&Arc<dyn AttributeConverter>> {
        self.converter.as_ref()
    }

    pub fn access(&self) -> FieldAccess {
        self.access
    }

    /// Descriptor of the nested type for `EMBEDDED` and `SUBENTITY` fields.
    pub fn nested(&self) -> Option<&TypeDescriptor> {
        self.nested.as_deref()
    }
}

impl Debug for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_name", &self.field_name)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("is_id", &self.is_id)
            .field("nested", &self.nested.as_ref().map(|n| n.name().to_string()))
            .finish()
    }
}

/// Builds and caches one [TypeDescriptor] per mapped type.
///
/// # Purpose
/// Describing a type validates its declaration, classifies every field and
/// recursively describes nested entity types. The result is cached by type
/// identity, so every later call returns the same `Arc`.
///
/// # Characteristics
/// - **Memoized**: the first call per type builds, later calls are a map lookup
/// - **Thread safe**: concurrent readers never block each other; when two threads
///   race to describe the same type, both build an equivalent descriptor and the
///   first one inserted is kept
/// - **Cycle safe**: a type that embeds itself, directly or through other types,
///   is rejected instead of recursing forever
/// - **Cheap to clone**: clones share the same cache
///
/// # Errors
/// Describing fails with `MappingError` when the type has no factory, declares
/// more than one identifier field, declares two fields with the same record-side
/// name, marks a nested entity as its identifier, or embeds itself.
#[derive(Clone, Default)]
pub struct MetadataRegistry {
    inner: Arc<MetadataRegistryInner>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        MetadataRegistry {
            inner: Arc::new(MetadataRegistryInner::default()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> MetadataRegistry {
        GLOBAL_REGISTRY.clone()
    }

    pub fn describe<T: Entity>(&self) -> MappingResult<Arc<TypeDescriptor>> {
        self.inner.describe(T::declare)
    }

    pub fn describe_declaration(&self, declare: Declare) -> MappingResult<Arc<TypeDescriptor>> {
        self.inner.describe(declare)
    }

    /// Whether `T` has already been described.
    pub fn contains<T: Entity>(&self) -> bool {
        self.inner.descriptors.contains_key(&TypeId::of::<T>())
    }

    /// Number of cached descriptors, nested types included.
    pub fn size(&self) -> usize {
        self.inner.descriptors.len()
    }
}

#[derive(Default)]
struct MetadataRegistryInner {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
}

impl MetadataRegistryInner {
    fn describe(&self, declare: Declare) -> MappingResult<Arc<TypeDescriptor>> {
        let mut in_progress = Vec::new();
        self.describe_with(declare(), &mut in_progress)
    }

    fn describe_with(
        &self,
        declaration: TypeDeclaration,
        in_progress: &mut Vec<TypeId>,
    ) -> MappingResult<Arc<TypeDescriptor>> {
        let type_id = declaration.type_id();
        let cached = self.descriptors.get(&type_id).map(|it| it.value().clone());
        if let Some(descriptor) = cached {
            return Ok(descriptor);
        }

        if in_progress.contains(&type_id) {
            log::error!("Type {} embeds itself", declaration.type_name());
            return Err(MappingError::new(
                &format!("Type {} embeds itself", declaration.type_name()),
                ErrorKind::MappingError,
            ));
        }

        in_progress.push(type_id);
        let built = self.build(&declaration, in_progress);
        in_progress.pop();

        let descriptor = Arc::new(built?);
        let descriptor = self.descriptors.entry(type_id).or_insert(descriptor).clone();
        log::debug!("Described type {} as {}", descriptor.type_name, descriptor.name);
        Ok(descriptor)
    }

    fn build(
        &self,
        declaration: &TypeDeclaration,
        in_progress: &mut Vec<TypeId>,
    ) -> MappingResult<TypeDescriptor> {
        let type_name = declaration.type_name();
        let factory = declaration.factory().ok_or_else(|| {
            log::error!("Type {} has no default construction path", type_name);
            MappingError::new(
                &format!("Type {} has no default construction path", type_name),
                ErrorKind::MappingError,
            )
        })?;

        let id_count = declaration.fields().iter().filter(|f| f.is_id()).count();
        if id_count > 1 {
            log::error!("Type {} declares {} identifier fields", type_name, id_count);
            return Err(MappingError::new(
                &format!("Type {} declares more than one identifier field", type_name),
                ErrorKind::MappingError,
            ));
        }

        let mut names = HashSet::new();
        let mut fields = Vec::with_capacity(declaration.fields().len());
        for field in declaration.fields() {
            let descriptor = self.build_field(type_name, field, in_progress)?;
            let mut columns = vec![descriptor.name.clone()];
            if descriptor.kind == FieldKind::SubEntity {
                if let Some(nested) = descriptor.nested() {
                    flattened_columns(nested, &mut columns);
                }
            }
            for column in columns {
                if !names.insert(column.clone()) {
                    log::error!("Type {} maps two fields to {}", type_name, column);
                    return Err(MappingError::new(
                        &format!("Type {} maps two fields to {}", type_name, column),
                        ErrorKind::MappingError,
                    ));
                }
            }
            fields.push(descriptor);
        }

        Ok(TypeDescriptor {
            type_id: declaration.type_id(),
            type_name,
            name: declaration.name().to_string(),
            id: fields.iter().position(|f| f.is_id),
            fields,
            factory,
        })
    }

    fn build_field(
        &self,
        type_name: &str,
        field: &FieldDeclaration,
        in_progress: &mut Vec<TypeId>,
    ) -> MappingResult<FieldDescriptor> {
        let kind = classify(field);
        let name = match (field.column(), field.is_id()) {
            (Some(column), _) => column.to_string(),
            (None, true) => DEFAULT_ID_NAME.to_string(),
            (None, false) => field.field_name().to_string(),
        };

        let (access, nested) = match field.shape() {
            FieldShape::Nested(access) => {
                if field.is_id() {
                    log::error!("Identifier {}.{} cannot be an entity", type_name, field.field_name());
                    return Err(MappingError::new(
                        &format!(
                            "Identifier {}.{} cannot be an entity",
                            type_name,
                            field.field_name()
                        ),
                        ErrorKind::MappingError,
                    ));
                }
                let nested = self.describe_with((access.declare)(), in_progress)?;
                (FieldAccess::Nested(*access), Some(nested))
            }
            FieldShape::Scalar(access)
            | FieldShape::Sequence(access)
            | FieldShape::Mapping(access) => (FieldAccess::Value(*access), None),
        };

        Ok(FieldDescriptor {
            field_name: field.field_name(),
            name,
            kind,
            is_id: field.is_id(),
            converter: field.converter().cloned(),
            access,
            nested,
        })
    }
}

/// Columns a sub-entity writes into its owner's record.
fn flattened_columns(descriptor: &TypeDescriptor, columns: &mut Vec<String>) {
    for field in descriptor.fields() {
        match field.nested() {
            Some(nested) if field.kind == FieldKind::SubEntity => {
                flattened_columns(nested, columns)
            }
            _ => columns.push(field.name.clone()),
        }
    }
}
