use crate::common::{BETWEEN, GREATER_THAN, GREATER_THAN_EQUAL, LESS_THAN, LESS_THAN_EQUAL, LIKE};
use std::fmt::{Display, Formatter};

/// Comparison applied by a condition leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    Like,
    Between,
}

impl Operator {
    /// Number of positional arguments the operator consumes.
    pub fn arity(&self) -> usize {
        match self {
            Operator::Between => 2,
            _ => 1,
        }
    }

    /// Splits a clause token into its field part and operator.
    ///
    /// Suffixes are matched against the end of the token, a token without a
    /// known suffix is an equality clause.
    pub(crate) fn split_suffix(token: &str) -> (&str, Operator) {
        const SUFFIXES: [(&str, Operator); 6] = [
            (BETWEEN, Operator::Between),
            (LESS_THAN_EQUAL, Operator::LessThanEqual),
            (GREATER_THAN_EQUAL, Operator::GreaterThanEqual),
            (LESS_THAN, Operator::LessThan),
            (GREATER_THAN, Operator::GreaterThan),
            (LIKE, Operator::Like),
        ];

        SUFFIXES
            .iter()
            .find_map(|(suffix, operator)| {
                token.strip_suffix(suffix).map(|field| (field, *operator))
            })
            .unwrap_or((token, Operator::Equals))
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Equals => write!(f, "EQUALS"),
            Operator::LessThan => write!(f, "LESS_THAN"),
            Operator::GreaterThan => write!(f, "GREATER_THAN"),
            Operator::LessThanEqual => write!(f, "LESS_THAN_EQUAL"),
            Operator::GreaterThanEqual => write!(f, "GREATER_THAN_EQUAL"),
            Operator::Like => write!(f, "LIKE"),
            Operator::Between => write!(f, "BETWEEN"),
        }
    }
}

/// Joins two conditions of a method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connector {
    And,
    Or,
}

impl Display for Connector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Connector::And => write!(f, "AND"),
            Connector::Or => write!(f, "OR"),
        }
    }
}
