//! Configuration loading, env substitution and validation.
//!
//! Config files: `hublink.toml`, `hublink.yaml`, `hublink.yml` or
//! `hublink.json`, searched in `./` then the user config directory
//! (`~/.config/hublink/` on Linux).
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution anywhere in
//! the file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, parse_config},
    schema::{BoundaryConfig, HubConfig, HublinkConfig},
};
