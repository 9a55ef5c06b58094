//! Beacon State: status ledger storage
//!
//! Persists the status records produced by polling and answers the
//! online-status query over stored rows.
//!
//! ## Key Components
//!
//! - `StatusLedger`: async, append-only storage trait
//! - `MemoryStatusLedger`: process-local ledger
//! - `FileStatusLedger`: append-only JSON-lines file ledger

mod error;
pub mod file;
pub mod memory;
mod rows;
pub mod storage_traits;

pub use error::StorageError;
pub use file::FileStatusLedger;
pub use memory::MemoryStatusLedger;
pub use storage_traits::{ProjectStatus, StatusId, StatusLedger, StorageResult};
