/// Database configuration and connection management
pub mod database;

/// Ledger settings (owner, seeded accounts and envelopes) from config.toml
pub mod settings;

pub use settings::{AccountConfig, CategoryConfig, Settings};
