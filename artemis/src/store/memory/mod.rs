mod async_manager;
mod manager;

pub use async_manager::*;
pub use manager::*;
