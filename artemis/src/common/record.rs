use crate::common::{ReadExecutor, Value};
use crate::FIELD_SEPARATOR;
use indexmap::IndexMap;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// A named, ordered collection of `(name, value)` entries.
///
/// # Purpose
/// `Record` is the store-agnostic form of an entity. The entity converter produces
/// records on the way out and consumes them on the way in, and store drivers only
/// ever see records.
///
/// # Characteristics
/// - **Ordered**: entries keep insertion order, replacing an entry keeps its position
/// - **Unique names**: a name appears at most once at each level
/// - **Nested**: an entry can hold another `Record` ([Value::Record]) for embedded fields
/// - **Order-insensitive equality**: two records are equal when they share the same
///   name and the same set of entries, regardless of entry order
///
/// # Usage
/// ```text
/// let mut person = Record::new("Person");
/// person.put("_id", 10);
/// person.put("name", "Ada");
///
/// let director = record!("Director", {
///     name: "Lana",
///     movie: { title: "Matrix", year: 1999 }
/// });
/// assert_eq!(director.find_path("movie.year"), Some(&Value::I32(1999)));
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    name: String,
    entries: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Adds an entry, replacing any entry with the same name in place.
    ///
    /// Returns the replaced value, if there was one.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Returns the value stored under `name` at this level.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Resolves a separator-delimited path through nested records.
    ///
    /// A top level entry whose name contains the separator wins over a nested
    /// lookup, so flat records written with dotted names still resolve.
    pub fn find_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.entries.get(path) {
            return Some(value);
        }

        let separator = FIELD_SEPARATOR.read_with(|it| it.clone());
        if separator.is_empty() || !path.contains(separator.as_str()) {
            return None;
        }

        let (head, tail) = path.split_once(separator.as_str())?;
        match self.entries.get(head) {
            Some(Value::Record(nested)) => nested.find_path(tail),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes the entry stored under `name`, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in record order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> &IndexMap<String, Value> {
        &self.entries
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Appends every entry of `other` at this level, replacing same-named entries.
    pub fn splice(&mut self, other: Record) {
        for (name, value) in other.entries {
            self.entries.insert(name, value);
        }
    }

    fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        self.entries.iter().sorted_by(|a, b| a.0.cmp(b.0)).collect()
    }

    pub fn to_pretty_json(&self, indent: usize) -> String {
        if self.entries.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let body = self
            .entries
            .iter()
            .map(|(name, value)| {
                format!("{}\"{}\": {}", indent_str, name, value.to_pretty_json(indent + 2))
            })
            .join(",\n");
        format!("{{\n{}\n{}}}", body, " ".repeat(indent))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.entries.get(name) == Some(value))
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.sorted_entries().cmp(&other.sorted_entries()))
    }
}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sorted_entries().hash(state);
    }
}

impl Debug for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = self
            .entries
            .iter()
            .map(|(name, value)| format!("{}: {:?}", name, value))
            .join(", ");
        write!(f, "{} {{{}}}", self.name, body)
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Record] with JSON-like syntax.
///
/// Nested braces become nested records named after their key.
///
/// ```rust,ignore
/// use artemis::record;
///
/// let actor = record!("Actor", {
///     "_id": 12,
///     name: "Keanu",
///     phones: ["555-1234", "555-4321"],
///     movie: { title: "Matrix", year: 1999 }
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($name:expr) => {
        $crate::common::Record::new($name)
    };

    ($name:expr, {}) => {
        $crate::common::Record::new($name)
    };

    ($name:expr, { $($key:tt : $value:tt),* $(,)? }) => {
        {
            let mut record = $crate::common::Record::new($name);
            $(
                let key = $crate::common::normalize(stringify!($key));
                let value = $crate::record_value!(key.as_str(), $value);
                record.put(key, value);
            )*
            record
        }
    };
}

/// Helper macro converting values for the [record!] macro.
#[macro_export]
macro_rules! record_value {
    ($key:expr, { $($k:tt : $v:tt),* $(,)? }) => {
        $crate::common::Value::Record($crate::record!($key, { $($k : $v),* }))
    };

    ($key:expr, [ $($v:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::record_value!($key, $v)),*])
    };

    ($key:expr, $value:expr) => {
        $crate::common::Value::from($value)
    };
}
