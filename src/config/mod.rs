//! Configuration loading, merging, and validation into a [`LoadTestConfig`].
pub(crate) mod apply;
mod loader;
mod parse;
mod run;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use run::{LoadTestConfig, PayloadSpec, TerminationMode};

#[cfg(test)]
pub(crate) use loader::load_config_file;
pub(crate) use parse::parse_duration_value;
