//! Configuration loading and management for the royalty distribution engine.
//!
//! This module loads the society settings (company, currency, fee, journal) and
//! the role split rules from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use royalty_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Fee: {}%", config.society().fee_percent);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllocationRules, DEFAULT_COMPOSER_SHARE, DEFAULT_FEE_PERCENT, DEFAULT_PERFORMER_SHARE,
    DEFAULT_TEXTER_SHARE, EngineConfig, OriginalsPolicy, SocietyConfig, TRANSFER_JOURNAL_CODE,
};
