//! Request body sources consumed by the worker pool.
mod source;


pub use source::{BodySource, Payload, PayloadSource};
