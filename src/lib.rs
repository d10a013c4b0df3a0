//! Core library for the `swarmload` CLI.
//!
//! A run is described by a [`config::LoadTestConfig`]. The
//! [`pool::WorkerPool`] drives one task per virtual user, each sending
//! requests through a [`http::RequestExecutor`] with bodies from a
//! [`payload::PayloadSource`], until the duration or iteration budget is
//! spent. The joined [`pool::ResultStore`] is then reduced by
//! [`metrics::StatsAggregator`] into nearest-rank latency statistics,
//! failure counts, and byte rates.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod payload;
pub mod pool;
