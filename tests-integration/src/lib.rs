/// Common test utilities and helpers for integration tests
use common::config::Configuration;
use common::testing::TestConfigBuilder;

pub mod generators;

/// Create a configuration for pipeline tests.
///
/// The acceptor binds an ephemeral port; the exporter targets the given
/// endpoint (usually a started `MetricsReceiverSink`).
pub fn create_test_config(exporter_endpoint: &str) -> Configuration {
    TestConfigBuilder::new()
        .with_exporter_endpoint(exporter_endpoint)
        .build()
}

/// Initialize test logging
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
