mod constants;
mod convertible;
mod record;
mod sort_order;
mod util;
mod value;

pub use constants::*;
pub use convertible::*;
pub use record::*;
pub use sort_order::*;
pub use util::*;
pub use value::*;
