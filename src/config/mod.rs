//! Configuration module for Review-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional and falls back to the defaults of the listing site
//! the crawler was written for.
//!
//! # Example
//!
//! ```no_run
//! use review_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("review-sweep.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DelayRange, InputConfig, OutputConfig, RegionEntry, SelectorConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
