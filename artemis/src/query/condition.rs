use crate::common::{Record, Value};
use crate::errors::MappingResult;
use crate::query::{Connector, Operator};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::mem::discriminant;

/// Operand of a condition leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Single(Value),
    /// Lower and upper bound of a `BETWEEN` clause, in call order
    Pair(Value, Value),
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Single(value) => write!(f, "{}", value),
            Operand::Pair(low, high) => write!(f, "[{}, {}]", low, high),
        }
    }
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Criterion {
    field: String,
    operator: Operator,
    operand: Operand,
}

impl Criterion {
    pub fn new(field: &str, operator: Operator, operand: Operand) -> Self {
        Criterion {
            field: field.to_string(),
            operator,
            operand,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    fn test(&self, record: &Record) -> MappingResult<bool> {
        let Some(value) = record.find_path(&self.field) else {
            return Ok(false);
        };

        match (&self.operator, &self.operand) {
            (Operator::Equals, Operand::Single(expected)) => Ok(value == expected),
            (Operator::LessThan, Operand::Single(bound)) => {
                Ok(compare(value, bound) == Some(Ordering::Less))
            }
            (Operator::GreaterThan, Operand::Single(bound)) => {
                Ok(compare(value, bound) == Some(Ordering::Greater))
            }
            (Operator::LessThanEqual, Operand::Single(bound)) => Ok(matches!(
                compare(value, bound),
                Some(Ordering::Less | Ordering::Equal)
            )),
            (Operator::GreaterThanEqual, Operand::Single(bound)) => Ok(matches!(
                compare(value, bound),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            (Operator::Between, Operand::Pair(low, high)) => Ok(matches!(
                compare(value, low),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                compare(value, high),
                Some(Ordering::Less | Ordering::Equal)
            )),
            (Operator::Like, Operand::Single(pattern)) => match (value, pattern) {
                (Value::String(text), Value::String(pattern)) => like(text, pattern),
                _ => Ok(false),
            },
            _ => {
                log::warn!("Operand {} does not fit operator {}", self.operand, self.operator);
                Ok(false)
            }
        }
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field, self.operator, self.operand)
    }
}

/// Binary condition tree compiled from a query method name.
///
/// Leaves compare one field, inner nodes combine two subtrees. Trees built by
/// the compiler are left-deep: `A And B Or C` becomes `(A AND B) OR C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Leaf(Criterion),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn leaf(field: &str, operator: Operator, operand: Operand) -> Self {
        Condition::Leaf(Criterion::new(field, operator, operand))
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Condition::leaf(field, Operator::Equals, Operand::Single(value.into()))
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    pub fn combine(self, connector: Connector, other: Condition) -> Self {
        match connector {
            Connector::And => self.and(other),
            Connector::Or => self.or(other),
        }
    }

    /// Evaluates the condition against a record.
    ///
    /// Field names are resolved as record paths, a missing field never matches
    /// and comparisons between incompatible kinds are false.
    pub fn test(&self, record: &Record) -> MappingResult<bool> {
        match self {
            Condition::Leaf(criterion) => criterion.test(record),
            Condition::And(left, right) => Ok(left.test(record)? && right.test(record)?),
            Condition::Or(left, right) => Ok(left.test(record)? || right.test(record)?),
        }
    }

    /// Rewrites every field name of the tree.
    pub fn map_fields<F>(&self, rename: &F) -> Condition
    where
        F: Fn(&str) -> String,
    {
        match self {
            Condition::Leaf(criterion) => Condition::Leaf(Criterion {
                field: rename(&criterion.field),
                operator: criterion.operator,
                operand: criterion.operand.clone(),
            }),
            Condition::And(left, right) => left.map_fields(rename).and(right.map_fields(rename)),
            Condition::Or(left, right) => left.map_fields(rename).or(right.map_fields(rename)),
        }
    }

    /// Leaves of the tree from left to right.
    pub fn criteria(&self) -> Vec<&Criterion> {
        match self {
            Condition::Leaf(criterion) => vec![criterion],
            Condition::And(left, right) | Condition::Or(left, right) => {
                let mut criteria = left.criteria();
                criteria.extend(right.criteria());
                criteria
            }
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Leaf(criterion) => write!(f, "{}", criterion),
            Condition::And(left, right) => write!(f, "({} AND {})", left, right),
            Condition::Or(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

fn compare(value: &Value, bound: &Value) -> Option<Ordering> {
    let comparable = (value.is_number() && bound.is_number())
        || discriminant(value) == discriminant(bound);
    comparable.then(|| value.cmp(bound))
}

/// Matches `text` against a SQL `LIKE` pattern, `%` spanning line breaks.
fn like(text: &str, pattern: &str) -> MappingResult<bool> {
    let mut expression = String::with_capacity(pattern.len() + 6);
    expression.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => expression.push_str(".*"),
            '_' => expression.push('.'),
            c => expression.push_str(&regex::escape(&c.to_string())),
        }
    }
    expression.push('$');
    Ok(Regex::new(&expression)?.is_match(text))
}
