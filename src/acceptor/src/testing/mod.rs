//! Test support for the acceptor.
//!
//! Available to this crate's unit tests and, through the `testing`
//! feature, to integration tests in dependent crates.

mod receiver_sink;

pub use receiver_sink::{MetricsReceiverSink, MetricsReceiverSinkBuilder};
