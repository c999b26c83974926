use crate::common::{Record, Value};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Conversion between a field type and its [Value] form.
///
/// Every plain, collection and map field of a mapped entity goes through this
/// trait on its way into and out of a [Record].
pub trait Convertible {
    type Output;

    fn to_value(&self) -> MappingResult<Value>;
    fn from_value(value: &Value) -> MappingResult<Self::Output>;
}

fn mismatch(value: &Value, expected: &str) -> MappingError {
    log::error!("Value {} is not {}", value, expected);
    MappingError::new(
        &format!("Value {} of type {} is not {}", value, value.type_name(), expected),
        ErrorKind::MappingError,
    )
}

// integers accept any integer variant whose value fits the target width
macro_rules! impl_convertible_for_integers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Convertible for $ty {
                type Output = $ty;

                fn to_value(&self) -> MappingResult<Value> {
                    Ok(Value::from(*self))
                }

                fn from_value(value: &Value) -> MappingResult<Self::Output> {
                    match value.as_integer() {
                        Some(v) => <$ty>::try_from(v).map_err(|_| {
                            log::error!("Value {} overflows {}", v, stringify!($ty));
                            MappingError::new(
                                &format!("Value {} overflows {}", v, stringify!($ty)),
                                ErrorKind::MappingError,
                            )
                        }),
                        None => Err(mismatch(value, concat!("an ", stringify!($ty)))),
                    }
                }
            }
        )*
    };
}

impl_convertible_for_integers!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::F32(*self))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::F32(v) => Ok(*v),
            _ if value.is_number() => Ok(value.as_decimal().unwrap_or_default() as f32),
            _ => Err(mismatch(value, "an f32")),
        }
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value.as_decimal() {
            Some(v) => Ok(v),
            None => Err(mismatch(value, "an f64")),
        }
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::Bool(v) => Ok(*v),
            _ => Err(mismatch(value, "a bool")),
        }
    }
}

impl Convertible for char {
    type Output = char;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::Char(*self))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::Char(v) => Ok(*v),
            Value::String(s) if s.chars().count() == 1 => {
                s.chars().next().ok_or_else(|| mismatch(value, "a char"))
            }
            _ => Err(mismatch(value, "a char")),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::String(v) => Ok(v.clone()),
            Value::Char(v) => Ok(v.to_string()),
            _ => Err(mismatch(value, "a string")),
        }
    }
}

impl Convertible for Record {
    type Output = Record;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::Record(self.clone()))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::Record(v) => Ok(v.clone()),
            _ => Err(mismatch(value, "a record")),
        }
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> MappingResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible,
{
    type Output = Box<T::Output>;

    fn to_value(&self) -> MappingResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        Ok(Box::new(T::from_value(value)?))
    }
}

fn array_items<'a>(value: &'a Value) -> MappingResult<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(mismatch(value, "an array")),
    }
}

fn map_entries<'a>(value: &'a Value) -> MappingResult<&'a BTreeMap<Value, Value>> {
    match value {
        Value::Map(entries) => Ok(entries),
        _ => Err(mismatch(value, "a map")),
    }
}

// sequences convert element-wise into Value::Array, keeping iteration order
macro_rules! impl_convertible_for_sequences {
    ($($seq:ident<$T:ident> where $($bound:path),*);* $(;)?) => {
        $(
            impl<$T> Convertible for $seq<$T>
            where
                $T: Convertible,
                $T::Output: $($bound +)*,
            {
                type Output = $seq<$T::Output>;

                fn to_value(&self) -> MappingResult<Value> {
                    let items = self
                        .iter()
                        .map(|item| item.to_value())
                        .collect::<MappingResult<Vec<Value>>>()?;
                    Ok(Value::Array(items))
                }

                fn from_value(value: &Value) -> MappingResult<Self::Output> {
                    array_items(value)?.iter().map(|item| $T::from_value(item)).collect()
                }
            }
        )*
    };
}

impl_convertible_for_sequences! {
    Vec<T> where Sized;
    VecDeque<T> where Sized;
    HashSet<T> where Eq, Hash;
    BTreeSet<T> where Ord;
}

impl<K, V> Convertible for HashMap<K, V>
where
    K: Convertible,
    V: Convertible,
    K::Output: Eq + Hash,
{
    type Output = HashMap<K::Output, V::Output>;

    fn to_value(&self) -> MappingResult<Value> {
        let mut map = BTreeMap::new();
        for (k, v) in self {
            map.insert(k.to_value()?, v.to_value()?);
        }
        Ok(Value::Map(map))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        map_entries(value)?
            .iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

impl<K, V> Convertible for BTreeMap<K, V>
where
    K: Convertible,
    V: Convertible,
    K::Output: Ord,
{
    type Output = BTreeMap<K::Output, V::Output>;

    fn to_value(&self) -> MappingResult<Value> {
        let mut map = BTreeMap::new();
        for (k, v) in self {
            map.insert(k.to_value()?, v.to_value()?);
        }
        Ok(Value::Map(map))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        map_entries(value)?
            .iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }
}

impl Convertible for NaiveDate {
    type Output = NaiveDate;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::String(self.format("%Y-%m-%d").to_string()))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                log::error!("Failed to parse date {}: {}", s, e);
                MappingError::new(&format!("Invalid date {}: {}", s, e), ErrorKind::MappingError)
            }),
            _ => Err(mismatch(value, "a date string")),
        }
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> MappingResult<Value> {
        Ok(Value::String(self.to_rfc3339()))
    }

    fn from_value(value: &Value) -> MappingResult<Self::Output> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|it| it.with_timezone(&Utc))
                .map_err(|e| {
                    log::error!("Failed to parse timestamp {}: {}", s, e);
                    MappingError::new(
                        &format!("Invalid timestamp {}: {}", s, e),
                        ErrorKind::MappingError,
                    )
                }),
            _ => Err(mismatch(value, "an RFC 3339 timestamp")),
        }
    }
}
