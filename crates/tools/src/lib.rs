//! Support code shared by the developer binaries.

pub mod config_file;
pub mod invariants;
