//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::LoadArgs;
pub use types::{HttpMethod, PositiveU64, PositiveUsize};

pub(crate) use defaults::{DEFAULT_DURATION, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};
