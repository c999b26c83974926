use std::fmt::{Display, Formatter};

/// Provider name used when a qualifier names none.
pub const DEFAULT_PROVIDER: &str = "default";

/// Family of NoSQL store a record manager talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    Document,
    Column,
    KeyValue,
}

impl Display for DatabaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::Document => write!(f, "DOCUMENT"),
            DatabaseType::Column => write!(f, "COLUMN"),
            DatabaseType::KeyValue => write!(f, "KEY_VALUE"),
        }
    }
}

/// Selects which registered store a template or repository binds to.
///
/// A qualifier pairs a provider name with a database type. A blank provider
/// name falls back to [DEFAULT_PROVIDER].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseQualifier {
    provider: String,
    database_type: DatabaseType,
}

impl DatabaseQualifier {
    pub fn new(provider: &str, database_type: DatabaseType) -> Self {
        let provider = provider.trim();
        DatabaseQualifier {
            provider: if provider.is_empty() {
                DEFAULT_PROVIDER.to_string()
            } else {
                provider.to_string()
            },
            database_type,
        }
    }

    pub fn of_document() -> Self {
        DatabaseQualifier::new(DEFAULT_PROVIDER, DatabaseType::Document)
    }

    pub fn of_document_provider(provider: &str) -> Self {
        DatabaseQualifier::new(provider, DatabaseType::Document)
    }

    pub fn of_column() -> Self {
        DatabaseQualifier::new(DEFAULT_PROVIDER, DatabaseType::Column)
    }

    pub fn of_column_provider(provider: &str) -> Self {
        DatabaseQualifier::new(provider, DatabaseType::Column)
    }

    pub fn of_key_value() -> Self {
        DatabaseQualifier::new(DEFAULT_PROVIDER, DatabaseType::KeyValue)
    }

    pub fn of_key_value_provider(provider: &str) -> Self {
        DatabaseQualifier::new(provider, DatabaseType::KeyValue)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn database_type(&self) -> DatabaseType {
        self.database_type
    }
}

impl Display for DatabaseQualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.database_type, self.provider)
    }
}
