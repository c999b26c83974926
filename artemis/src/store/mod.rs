//! Boundary to the external store drivers.
//!
//! The mapping layer hands records to a [RecordManager] or an
//! [AsyncRecordManager], selected by a [DatabaseQualifier]. Drivers implement
//! [RecordManagerProvider] or [AsyncRecordManagerProvider].
//!
//! # Drivers
//!
//! - **In-Memory**: [memory::MemoryRecordManager] and
//!   [memory::MemoryAsyncRecordManager], reference drivers for tests

mod async_record_manager;
pub mod memory;
mod qualifier;
mod record_manager;

pub use async_record_manager::*;
pub use qualifier::*;
pub use record_manager::*;
