//! Test utilities for pointbridge.
//!
//! This module is only available when the `testing` feature is enabled or
//! during tests:
//!
//! ```toml
//! [dependencies]
//! common = { path = "../common", features = ["testing"] }
//! ```

mod config_builder;

pub use config_builder::TestConfigBuilder;
