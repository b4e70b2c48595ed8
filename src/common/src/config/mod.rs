use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use once_cell::sync::OnceCell;

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

/// Configuration for the datapoint acceptor service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AcceptorConfig {
    /// Address the HTTP ingest endpoint binds to
    pub listen_addr: String,
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self {
            listen_addr: String::from("0.0.0.0:9080"),
        }
    }
}

/// Configuration for the downstream metrics exporter
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// URL the converted metrics are POSTed to
    pub endpoint: String,
    /// Per-request timeout for exporter HTTP calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://127.0.0.1:9090/v1/metrics"),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Acceptor (ingest) configuration
    pub acceptor: AcceptorConfig,
    /// Exporter (downstream sink) configuration
    pub exporter: ExporterConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("pointbridge.toml"))
            .merge(Env::prefixed("POINTBRIDGE__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
