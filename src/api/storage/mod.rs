// Storage module - diagram persistence backends

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::StorageError;
pub use memory::MemoryDiagramStore;
pub use postgres::PostgresDiagramStore;
pub use traits::{DiagramStore, UserContext};
