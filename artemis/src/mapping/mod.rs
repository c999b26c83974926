mod attribute_converter;
mod classifier;
mod converter;
mod declaration;
mod registry;


pub use attribute_converter::*;
pub use classifier::*;
pub use converter::*;
pub use declaration::*;
pub use registry::*;
