use filters::config::{Config as FiltersConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;
use url::Url;

const BASE_URL_ENV: &str = "PRESET_BASE_URL";
const ACCESS_TOKEN_ENV: &str = "PRESET_ACCESS_TOKEN";

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub filters: FiltersConfig,
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let mut config: Config = serde_yaml::from_reader(file)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.filters.validate()?;

        Ok(config)
    }

    /// Environment values take precedence over the file.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.filters.api.base_url =
                Url::parse(&base_url).map_err(|e| ConfigError::InvalidEnv(BASE_URL_ENV, e.to_string()))?;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV) {
            self.filters.api.access_token = Some(token);
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
    #[error("invalid value in {0}: {1}")]
    InvalidEnv(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            api:
                base_url: https://1234abcd.us1a.app.preset.io
                timeout_secs: 15
            upsert:
                lock_timeout_secs: 120
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://public@sentry.example.com/1
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.filters.api.timeout_secs, 15);
        assert_eq!(config.filters.upsert.lock_timeout_secs, Some(120));
        assert_eq!(config.metrics.expect("metrics config").statsd_port, 8125);
        assert!(config.logging.is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let tmp = write_tmp_file("api:\n    base_url: http://localhost:8088\n    timeout_secs: 0\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Invalid(ValidationError::InvalidTimeout))
        ));

        let tmp = write_tmp_file("metrics: {statsd_host: localhost, statsd_port: 8125}\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn env_overrides() {
        let mut config: Config = serde_yaml::from_str(
            "api: {base_url: \"http://localhost:8088\", access_token: from-file}",
        )
        .unwrap();

        let env = HashMap::from([
            (BASE_URL_ENV, "https://workspace.example.com"),
            (ACCESS_TOKEN_ENV, "from-env"),
        ]);
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            config.filters.api.base_url.as_str(),
            "https://workspace.example.com/"
        );
        assert_eq!(config.filters.api.access_token.as_deref(), Some("from-env"));

        let env = HashMap::from([(BASE_URL_ENV, "not a url")]);
        assert!(matches!(
            config.apply_env(|key| env.get(key).map(|v| v.to_string())),
            Err(ConfigError::InvalidEnv(BASE_URL_ENV, _))
        ));
    }
}
