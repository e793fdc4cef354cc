//! Service implementations
//!
//! Real implementations of the record source and assignment store traits,
//! plus the CSV export of a finished allocation.

pub mod csv_source;
pub mod export;
pub mod file_store;
pub mod memory_store;

pub use csv_source::CsvRecordSource;
pub use export::{export_allocation_csv, ExportPaths};
pub use file_store::JsonFileStore;
pub use memory_store::InMemoryStore;
