use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_sql_host")]
    pub sql_host: String,
    #[serde(default = "default_sql_port")]
    pub sql_port: u16,
    #[serde(default = "default_sql_db")]
    pub sql_db: String,
    #[serde(default)]
    pub sql_user: Option<String>,
    #[serde(default)]
    pub sql_pass: Option<String>,
    #[serde(default = "default_sql_connection_limit")]
    pub sql_connection_limit: u32,
    #[serde(default = "default_sql_timezone")]
    pub sql_timezone: String,
    #[serde(default = "default_sql_acquire_timeout_secs")]
    pub sql_acquire_timeout_secs: u64,
    #[serde(default = "default_sql_query_timeout_secs")]
    pub sql_query_timeout_secs: u64,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_index_title")]
    pub index_title: String,
    #[serde(default = "default_search_title")]
    pub search_title: String,
}

fn default_sql_host() -> String {
    "localhost".to_string()
}

const fn default_sql_port() -> u16 {
    3306
}

fn default_sql_db() -> String {
    "playstore".to_string()
}

const fn default_sql_connection_limit() -> u32 {
    4
}

fn default_sql_timezone() -> String {
    "+08:00".to_string()
}

const fn default_sql_acquire_timeout_secs() -> u64 {
    5
}

const fn default_sql_query_timeout_secs() -> u64 {
    10
}

const fn default_port() -> u16 {
    3000
}

fn default_index_title() -> String {
    "Search for an app.".to_string()
}

fn default_search_title() -> String {
    "Search results".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sql_host: default_sql_host(),
            sql_port: default_sql_port(),
            sql_db: default_sql_db(),
            sql_user: None,
            sql_pass: None,
            sql_connection_limit: default_sql_connection_limit(),
            sql_timezone: default_sql_timezone(),
            sql_acquire_timeout_secs: default_sql_acquire_timeout_secs(),
            sql_query_timeout_secs: default_sql_query_timeout_secs(),
            port: default_port(),
            index_title: default_index_title(),
            search_title: default_search_title(),
        }
    }
}

impl AppConfig {
    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.sql_acquire_timeout_secs)
    }

    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.sql_query_timeout_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.sql_connection_limit == 0 {
            return Err(ConfigError::Message(
                "sql_connection_limit must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    load_config(Environment::default())
}

/// Layers an optional `config` file under the given environment source.
fn load_config(environment: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(environment)
        .build()?;

    config.try_deserialize::<AppConfig>()?.validate()
}
