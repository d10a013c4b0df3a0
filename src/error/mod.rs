mod app;
mod config;
mod http;
mod payload;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use payload::PayloadError;
pub use validation::ValidationError;
