//! Configuration module for the expense ledger
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
