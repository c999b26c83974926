// record constants
pub const DEFAULT_ID_NAME: &str = "_id";
pub const DEFAULT_FIELD_SEPARATOR: &str = ".";

// query method prefixes
pub const FIND_BY: &str = "findBy";
pub const GET_BY: &str = "getBy";
pub const DELETE_BY: &str = "deleteBy";
pub const EXISTS_BY: &str = "existsBy";

// query method connectors
pub const AND: &str = "And";
pub const OR: &str = "Or";
pub const LEGACY_AND: &str = "AND";
pub const LEGACY_OR: &str = "OR";
pub const ORDER_BY: &str = "OrderBy";
pub const ASC: &str = "Asc";
pub const DESC: &str = "Desc";

// query method suffixes, longest match first
pub const BETWEEN: &str = "Between";
pub const LESS_THAN: &str = "LessThan";
pub const GREATER_THAN: &str = "GreaterThan";
pub const LESS_THAN_EQUAL: &str = "LessEqualThan";
pub const GREATER_THAN_EQUAL: &str = "GreaterEqualThan";
pub const LIKE: &str = "Like";

pub const ARTEMIS_VERSION: &str = env!("CARGO_PKG_VERSION");
