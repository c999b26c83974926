use crate::common::{
    Sort, SortOrder, AND, ASC, DELETE_BY, DESC, EXISTS_BY, FIND_BY, GET_BY, LEGACY_AND, LEGACY_OR,
    OR, ORDER_BY,
};
use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::query::{Connector, Operator};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// Kind of query a method name starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Find,
    Get,
    Delete,
    Exists,
}

impl QueryKind {
    fn from_method(method: &str) -> Option<(QueryKind, &str)> {
        [
            (FIND_BY, QueryKind::Find),
            (GET_BY, QueryKind::Get),
            (DELETE_BY, QueryKind::Delete),
            (EXISTS_BY, QueryKind::Exists),
        ]
        .into_iter()
        .find_map(|(prefix, kind)| method.strip_prefix(prefix).map(|rest| (kind, rest)))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, QueryKind::Delete)
    }
}

/// One `<Field>[<Suffix>]` clause of a method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    field: String,
    operator: Operator,
}

impl Clause {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.operator)
    }
}

/// Parsed form of a query method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMethod {
    pub(crate) name: String,
    pub(crate) kind: QueryKind,
    pub(crate) clauses: SmallVec<[Clause; 4]>,
    pub(crate) connectors: SmallVec<[Connector; 4]>,
    pub(crate) sorts: Vec<Sort>,
}

/// Parses a method name of the form
/// `find|get|delete|exists By <clause> (And|Or <clause>)* [OrderBy <field>[Asc|Desc] (And <field>[Asc|Desc])*]`.
pub(crate) fn parse(method: &str) -> MappingResult<ParsedMethod> {
    let (kind, body) = QueryKind::from_method(method).ok_or_else(|| {
        log::error!("Method {} does not start with a query prefix", method);
        MappingError::new(
            &format!("Method {} does not start with a query prefix", method),
            ErrorKind::DynamicQueryError,
        )
    })?;

    let (condition, order) = match find_keyword(body, ORDER_BY) {
        Some(index) => (&body[..index], Some(&body[index + ORDER_BY.len()..])),
        None => (body, None),
    };

    if condition.is_empty() {
        log::error!("Method {} has no condition", method);
        return Err(MappingError::new(
            &format!("Method {} has no condition", method),
            ErrorKind::DynamicQueryError,
        ));
    }

    let mut clauses = SmallVec::new();
    let mut connectors = SmallVec::new();
    for (connector, token) in tokenize(condition, true) {
        let (field, operator) = Operator::split_suffix(token);
        let field = field_name(method, field)?;
        if let Some(connector) = connector {
            connectors.push(connector);
        }
        clauses.push(Clause { field, operator });
    }

    let mut sorts = Vec::new();
    if let Some(order) = order {
        for (_, token) in tokenize(order, false) {
            let (field, direction) = if let Some(field) = token.strip_suffix(DESC) {
                (field, SortOrder::Descending)
            } else if let Some(field) = token.strip_suffix(ASC) {
                (field, SortOrder::Ascending)
            } else {
                (token, SortOrder::Ascending)
            };
            sorts.push(Sort::new(&field_name(method, field)?, direction));
        }
    }

    Ok(ParsedMethod {
        name: method.to_string(),
        kind,
        clauses,
        connectors,
        sorts,
    })
}

/// Splits `text` at every connector that follows a non-empty token and precedes
/// an upper-case character. With `with_or` unset only `And` separates tokens.
fn tokenize(text: &str, with_or: bool) -> Vec<(Option<Connector>, &str)> {
    let keywords: &[(&str, Connector)] = if with_or {
        &[
            (AND, Connector::And),
            (OR, Connector::Or),
            (LEGACY_AND, Connector::And),
            (LEGACY_OR, Connector::Or),
        ]
    } else {
        &[(AND, Connector::And), (LEGACY_AND, Connector::And)]
    };

    let mut tokens = Vec::new();
    let mut pending = None;
    let mut start = 0;
    let mut index = 0;
    while index < text.len() {
        let matched = (index > start)
            .then(|| {
                keywords.iter().find(|(keyword, _)| {
                    text[index..].starts_with(keyword) && starts_upper(&text[index + keyword.len()..])
                })
            })
            .flatten();

        match matched {
            Some((keyword, connector)) => {
                tokens.push((pending, &text[start..index]));
                pending = Some(*connector);
                index += keyword.len();
                start = index;
            }
            None => {
                index += text[index..].chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
    }
    tokens.push((pending, &text[start..]));
    tokens
}

fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    text.match_indices(keyword)
        .map(|(index, _)| index)
        .find(|index| starts_upper(&text[index + keyword.len()..]))
}

fn starts_upper(text: &str) -> bool {
    text.chars().next().map(char::is_uppercase).unwrap_or(false)
}

fn field_name(method: &str, token: &str) -> MappingResult<String> {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => Ok(first.to_lowercase().chain(chars).collect()),
        None => {
            log::error!("Method {} has a clause without a field", method);
            Err(MappingError::new(
                &format!("Method {} has a clause without a field", method),
                ErrorKind::DynamicQueryError,
            ))
        }
    }
}
