//! Configuration loading and validation
//!
//! The configuration is a TOML file describing the crawl target, the
//! user-agent identification, and the output database location.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, OutputConfig, ScraperConfig, UserAgentConfig};
pub use validation::validate;
