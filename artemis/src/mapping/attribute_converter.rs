use crate::common::Value;
use crate::errors::MappingResult;

/// Custom conversion between a field's value and its record-side representation.
///
/// Attach a converter to a field with `#[column(converter = MyConverter)]`; the
/// converter type must implement `Default`. The entity converter applies
/// `to_record_value` after reading the field and `to_entity_value` before
/// writing it back, so the field type itself still goes through
/// [Convertible](crate::common::Convertible).
///
/// Any error returned here surfaces as a mapping error naming the field.
pub trait AttributeConverter: Send + Sync {
    fn to_record_value(&self, value: &Value) -> MappingResult<Value>;

    fn to_entity_value(&self, value: &Value) -> MappingResult<Value>;
}
