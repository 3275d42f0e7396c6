//! CLI commands

pub mod scan;
pub mod status;
pub mod types;
