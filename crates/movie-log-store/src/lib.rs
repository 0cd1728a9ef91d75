pub mod backend;
pub mod error;
pub mod log;
pub mod memory;
pub mod mysql;

pub use backend::LogBackend;
pub use error::StoreError;
pub use log::MovieLog;
pub use memory::MemoryBackend;
pub use mysql::MySqlBackend;
