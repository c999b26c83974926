use crate::common::{Record, Value};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::mapping::{
    downcast_box, Entity, FieldAccess, FieldDescriptor, FieldKind, MetadataRegistry,
    TypeDescriptor,
};
use std::any::Any;

/// Converts entities to records and back using the descriptors of a
/// [MetadataRegistry].
///
/// Records keep the identifier entry first and every other entry in
/// declaration order. Null field values produce no entry at all.
///
/// Nested entities are written in two forms:
/// - `EMBEDDED` fields become a child record stored under the field's name
/// - `SUBENTITY` fields splice their entries directly into the parent record
///
/// Reading accepts both forms for both kinds, so a flat record converts back to
/// the same entity as its nested counterpart.
#[derive(Clone)]
pub struct EntityConverter {
    registry: MetadataRegistry,
}

impl Default for EntityConverter {
    fn default() -> Self {
        EntityConverter::new(MetadataRegistry::global())
    }
}

impl EntityConverter {
    pub fn new(registry: MetadataRegistry) -> Self {
        EntityConverter { registry }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn to_record<T: Entity>(&self, entity: &T) -> MappingResult<Record> {
        let descriptor = self.registry.describe::<T>()?;
        self.to_record_with(&descriptor, entity)
    }

    pub fn to_record_with(
        &self,
        descriptor: &TypeDescriptor,
        entity: &dyn Any,
    ) -> MappingResult<Record> {
        let mut record = Record::new(descriptor.name());
        self.write_fields(descriptor, entity, &mut record)?;
        Ok(record)
    }

    pub fn to_entity<T: Entity>(&self, record: &Record) -> MappingResult<T> {
        let descriptor = self.registry.describe::<T>()?;
        let entity = self.to_entity_with(&descriptor, record)?;
        Ok(*downcast_box::<T>(entity)?)
    }

    pub fn to_entity_with(
        &self,
        descriptor: &TypeDescriptor,
        record: &Record,
    ) -> MappingResult<Box<dyn Any + Send>> {
        if record.is_empty() {
            log::error!("Record {} has no entries to build {} from", record.name(), descriptor.type_name());
            return Err(MappingError::new(
                &format!(
                    "Record {} has no entries to build {} from",
                    record.name(),
                    descriptor.type_name()
                ),
                ErrorKind::MappingError,
            ));
        }

        let mut entity = descriptor.new_instance();
        self.read_fields(descriptor, record, &mut *entity)?;
        Ok(entity)
    }

    fn write_fields(
        &self,
        descriptor: &TypeDescriptor,
        entity: &dyn Any,
        record: &mut Record,
    ) -> MappingResult<()> {
        let fields = descriptor
            .id()
            .into_iter()
            .chain(descriptor.fields().iter().filter(|f| !f.is_id()));

        for field in fields {
            match field.access() {
                FieldAccess::Value(access) => {
                    let value = (access.get)(entity)
                        .map_err(|err| field_error(descriptor, field, err))?;
                    if value.is_null() {
                        continue;
                    }

                    let value = match field.converter() {
                        Some(converter) => converter
                            .to_record_value(&value)
                            .map_err(|err| field_error(descriptor, field, err))?,
                        None => value,
                    };
                    if !value.is_null() {
                        record.put(field.name(), value);
                    }
                }
                FieldAccess::Nested(access) => {
                    let nested = nested_descriptor(descriptor, field)?;
                    let Some(child) = (access.get)(entity)
                        .map_err(|err| field_error(descriptor, field, err))?
                    else {
                        continue;
                    };

                    if field.kind() == FieldKind::Embedded {
                        let mut child_record = Record::new(field.name());
                        self.write_fields(nested, child, &mut child_record)?;
                        record.put(field.name(), child_record);
                    } else {
                        self.write_fields(nested, child, record)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn read_fields(
        &self,
        descriptor: &TypeDescriptor,
        record: &Record,
        entity: &mut dyn Any,
    ) -> MappingResult<()> {
        for field in descriptor.fields() {
            match field.access() {
                FieldAccess::Value(access) => {
                    let Some(value) = record.find(field.name()) else {
                        continue;
                    };
                    if value.is_null() {
                        continue;
                    }

                    let value = match field.converter() {
                        Some(converter) => converter
                            .to_entity_value(value)
                            .map_err(|err| field_error(descriptor, field, err))?,
                        None => value.clone(),
                    };
                    (access.set)(entity, &value)
                        .map_err(|err| field_error(descriptor, field, err))?;
                }
                FieldAccess::Nested(access) => {
                    let nested = nested_descriptor(descriptor, field)?;
                    let source = match record.find(field.name()) {
                        Some(Value::Record(child)) => Some(child),
                        Some(other) => {
                            log::warn!(
                                "Ignoring entry {} of type {}, a record is expected for {}",
                                field.name(),
                                other.type_name(),
                                nested.type_name()
                            );
                            None
                        }
                        None => None,
                    };

                    let source = source.or_else(|| nested.matches(record).then_some(record));
                    let Some(source) = source else {
                        continue;
                    };

                    let mut child = nested.new_instance();
                    self.read_fields(nested, source, &mut *child)?;
                    (access.set)(entity, child)
                        .map_err(|err| field_error(descriptor, field, err))?;
                }
            }
        }
        Ok(())
    }
}

fn nested_descriptor<'a>(
    descriptor: &'a TypeDescriptor,
    field: &'a FieldDescriptor,
) -> MappingResult<&'a TypeDescriptor> {
    field.nested().ok_or_else(|| {
        log::error!("Field {}.{} has no nested descriptor", descriptor.type_name(), field.field_name());
        MappingError::new(
            &format!(
                "Field {}.{} has no nested descriptor",
                descriptor.type_name(),
                field.field_name()
            ),
            ErrorKind::InternalError,
        )
    })
}

fn field_error(descriptor: &TypeDescriptor, field: &FieldDescriptor, cause: MappingError) -> MappingError {
    log::error!(
        "Failed to convert field {}.{}: {}",
        descriptor.type_name(),
        field.field_name(),
        cause
    );
    MappingError::new_with_cause(
        &format!(
            "Failed to convert field {}.{}",
            descriptor.type_name(),
            field.field_name()
        ),
        ErrorKind::MappingError,
        cause,
    )
}
