mod async_template;
mod entity_template;

pub use async_template::*;
pub use entity_template::*;
