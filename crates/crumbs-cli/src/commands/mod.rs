//! Command implementations for crumbs-cli

pub mod scan;
pub mod sessions;
pub mod status;

pub use scan::{ScanOptions, run_scan};
pub use sessions::run_sessions;
pub use status::run_status;
