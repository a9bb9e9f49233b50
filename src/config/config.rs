use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: the remote API, the token endpoint, the session
/// cookies and the server binding.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    pub token: TokenConfig,
    pub session: SessionConfig,
    pub bind_address: String,
    pub logging: LoggingConfig,
}

/// The remote Connect.Club REST API.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ApiConfig {
    /// Base URL prefixed to root-relative endpoints.
    pub base_url: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
}

/// The OAuth-like token exchange endpoint and the client identity sent with
/// every grant.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct TokenConfig {
    pub endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_device_id")]
    pub device_id: String,
}

/// Cookie names and the secret the encrypted session cookie is keyed from.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,
    /// Key material for the encrypted session cookie; at least 32 bytes.
    pub secret: String,
    #[serde(default = "default_token_cookie")]
    pub token_cookie: String,
    #[serde(default)]
    pub cookie_domain: Option<String>,
}

fn default_logout_path() -> String {
    "/v1/account/logout".to_string()
}

fn default_device_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_session_cookie() -> String {
    "cc_session".to_string()
}

fn default_token_cookie() -> String {
    "ccUserToken".to_string()
}

/// Load config from "config.yaml" in the current directory, with
/// CLUBGATE_-prefixed environment overrides.
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("CLUBGATE_").split("__"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    let Config::ConfigV1(config) = config;
    if config.session.secret.len() < 32 {
        eprintln!("Error loading configuration: session.secret must be at least 32 bytes");
        std::process::exit(1);
    }
    config
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
