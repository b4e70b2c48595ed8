//! Test configuration builder for creating test setups quickly.

use std::time::Duration;

use crate::config::Configuration;

/// Builder for creating test configurations.
///
/// Provides a fluent API for creating configurations suitable for testing,
/// with sensible defaults that can be customized as needed.
///
/// # Example
///
/// ```rust,ignore
/// use common::testing::TestConfigBuilder;
///
/// let config = TestConfigBuilder::new()
///     .with_listen_addr("127.0.0.1:0")
///     .with_exporter_endpoint("http://127.0.0.1:9090/v1/metrics")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: Configuration,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    /// Create a new test configuration builder. The defaults bind the
    /// acceptor to an ephemeral loopback port so parallel tests never fight
    /// over an address.
    pub fn new() -> Self {
        let mut config = Configuration::default();
        config.acceptor.listen_addr = "127.0.0.1:0".to_string();
        Self { config }
    }

    /// Set the acceptor listen address.
    pub fn with_listen_addr(mut self, addr: &str) -> Self {
        self.config.acceptor.listen_addr = addr.to_string();
        self
    }

    /// Set the exporter endpoint URL.
    pub fn with_exporter_endpoint(mut self, endpoint: &str) -> Self {
        self.config.exporter.endpoint = endpoint.to_string();
        self
    }

    /// Set the exporter request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.exporter.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Configuration {
        self.config
    }
}
