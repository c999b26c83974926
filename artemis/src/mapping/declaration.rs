use crate::common::Value;
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::AttributeConverter;
use std::any::{type_name, Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Creates a fresh instance of a mapped type.
pub type Factory = fn() -> Box<dyn Any + Send>;
/// Produces the declaration of a mapped type.
pub type Declare = fn() -> TypeDeclaration;
/// Reads a plain, collection or map field as a [Value].
pub type ValueGetter = fn(&dyn Any) -> MappingResult<Value>;
/// Writes a plain, collection or map field from a [Value].
pub type ValueSetter = fn(&mut dyn Any, &Value) -> MappingResult<()>;
/// Borrows a nested entity field, `None` when the field holds no value.
pub type NestedGetter = fn(&dyn Any) -> MappingResult<Option<&dyn Any>>;
/// Moves a freshly built nested entity into its field.
pub type NestedSetter = fn(&mut dyn Any, Box<dyn Any + Send>) -> MappingResult<()>;

/// A type that can be mapped to and from a [Record](crate::common::Record).
///
/// Implementations are normally generated with `#[derive(Entity)]` from the
/// `artemis_derive` crate. A hand-written implementation only has to describe
/// its fields:
///
/// ```rust,ignore
/// impl Entity for Movie {
///     fn declare() -> TypeDeclaration {
///         TypeDeclaration::new::<Movie>("Movie")
///             .as_embeddable()
///             .with_factory(default_factory::<Movie>)
///             .with_field(FieldDeclaration::scalar("title", get_title, set_title))
///     }
/// }
/// ```
pub trait Entity: Any + Send {
    fn declare() -> TypeDeclaration;
}

/// Raw, unclassified description of a mapped type as declared by its author.
///
/// A declaration is only an input to the
/// [MetadataRegistry](crate::mapping::MetadataRegistry), which validates it,
/// classifies every field and caches the resulting
/// [TypeDescriptor](crate::mapping::TypeDescriptor).
#[derive(Clone)]
pub struct TypeDeclaration {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<String>,
    embeddable: bool,
    factory: Option<Factory>,
    fields: Vec<FieldDeclaration>,
}

impl TypeDeclaration {
    /// Starts a declaration for `T`, `type_name` is its simple name.
    pub fn new<T: Any>(type_name: &'static str) -> Self {
        TypeDeclaration {
            type_id: TypeId::of::<T>(),
            type_name,
            name: None,
            embeddable: false,
            factory: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the logical name, which otherwise defaults to the simple type name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Marks the type as embeddable: fields of this type nest under their own name.
    pub fn as_embeddable(mut self) -> Self {
        self.embeddable = true;
        self
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.type_name)
    }

    pub fn is_embeddable(&self) -> bool {
        self.embeddable
    }

    pub fn factory(&self) -> Option<Factory> {
        self.factory
    }

    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }
}

impl Debug for TypeDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDeclaration")
            .field("type_name", &self.type_name)
            .field("name", &self.name())
            .field("embeddable", &self.embeddable)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Accessors of a plain, collection or map field.
#[derive(Clone, Copy)]
pub struct ValueAccess {
    pub get: ValueGetter,
    pub set: ValueSetter,
}

/// Accessors of a field whose type is itself a mapped entity.
#[derive(Clone, Copy)]
pub struct NestedAccess {
    pub declare: Declare,
    pub get: NestedGetter,
    pub set: NestedSetter,
}

/// Static shape of a field's declared type.
#[derive(Clone, Copy)]
pub enum FieldShape {
    /// Any single value
    Scalar(ValueAccess),
    /// A homogeneous sequence such as `Vec` or `HashSet`
    Sequence(ValueAccess),
    /// A key to value mapping such as `HashMap`
    Mapping(ValueAccess),
    /// Another mapped entity
    Nested(NestedAccess),
}

impl Debug for FieldShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldShape::Scalar(_) => write!(f, "Scalar"),
            FieldShape::Sequence(_) => write!(f, "Sequence"),
            FieldShape::Mapping(_) => write!(f, "Mapping"),
            FieldShape::Nested(access) => write!(f, "Nested({})", (access.declare)().type_name()),
        }
    }
}

/// Per-field configuration: identifier flag, logical name override, optional
/// converter, declared shape and access handles.
#[derive(Clone)]
pub struct FieldDeclaration {
    field_name: &'static str,
    column: Option<String>,
    id: bool,
    shape: FieldShape,
    converter: Option<Arc<dyn AttributeConverter>>,
}

impl FieldDeclaration {
    fn new(field_name: &'static str, shape: FieldShape) -> Self {
        FieldDeclaration {
            field_name,
            column: None,
            id: false,
            shape,
            converter: None,
        }
    }

    pub fn scalar(field_name: &'static str, get: ValueGetter, set: ValueSetter) -> Self {
        FieldDeclaration::new(field_name, FieldShape::Scalar(ValueAccess { get, set }))
    }

    pub fn sequence(field_name: &'static str, get: ValueGetter, set: ValueSetter) -> Self {
        FieldDeclaration::new(field_name, FieldShape::Sequence(ValueAccess { get, set }))
    }

    pub fn mapping(field_name: &'static str, get: ValueGetter, set: ValueSetter) -> Self {
        FieldDeclaration::new(field_name, FieldShape::Mapping(ValueAccess { get, set }))
    }

    pub fn nested(
        field_name: &'static str,
        declare: Declare,
        get: NestedGetter,
        set: NestedSetter,
    ) -> Self {
        FieldDeclaration::new(field_name, FieldShape::Nested(NestedAccess { declare, get, set }))
    }

    /// Overrides the record-side name of the field.
    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    /// Marks the field as the identifier of its type.
    pub fn as_id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn with_converter<C: AttributeConverter + 'static>(mut self, converter: C) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn is_id(&self) -> bool {
        self.id
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub fn converter(&self) -> Option<&Arc<dyn AttributeConverter>> {
        self.converter.as_ref()
    }
}

impl Debug for FieldDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDeclaration")
            .field("field_name", &self.field_name)
            .field("column", &self.column)
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Factory for any type with a `Default` implementation.
pub fn default_factory<T: Default + Send + 'static>() -> Box<dyn Any + Send> {
    Box::new(T::default())
}

pub fn downcast_ref<T: Any>(entity: &dyn Any) -> MappingResult<&T> {
    entity.downcast_ref::<T>().ok_or_else(|| {
        log::error!("Entity is not an instance of {}", type_name::<T>());
        MappingError::new(
            &format!("Entity is not an instance of {}", type_name::<T>()),
            ErrorKind::MappingError,
        )
    })
}

pub fn downcast_mut<T: Any>(entity: &mut dyn Any) -> MappingResult<&mut T> {
    entity.downcast_mut::<T>().ok_or_else(|| {
        log::error!("Entity is not an instance of {}", type_name::<T>());
        MappingError::new(
            &format!("Entity is not an instance of {}", type_name::<T>()),
            ErrorKind::MappingError,
        )
    })
}

pub fn downcast_box<T: Any>(value: Box<dyn Any + Send>) -> MappingResult<Box<T>> {
    value.downcast::<T>().map_err(|_| {
        log::error!("Nested value is not an instance of {}", type_name::<T>());
        MappingError::new(
            &format!("Nested value is not an instance of {}", type_name::<T>()),
            ErrorKind::MappingError,
        )
    })
}
