//! Shared types for the stocktake allocation system
//!
//! Contains the plain records exchanged between the record loaders, the
//! allocation engine and the assignment stores, plus the logging setup
//! every binary uses.

pub mod errors;
pub mod logging;
pub mod records;
pub mod types;

pub use errors::*;
pub use records::RawRecord;
pub use types::*;
