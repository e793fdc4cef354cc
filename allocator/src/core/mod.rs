//! Core business logic modules
//!
//! Pure allocation and tracking logic with no I/O dependencies.

pub mod allocator;
pub mod run;
pub mod tracker;

pub use allocator::{allocate, validate_inputs, Allocation, MemberSummary};
pub use run::AllocationRun;
pub use tracker::{Action, MemberProgress, StatusPatch, Tracker};
