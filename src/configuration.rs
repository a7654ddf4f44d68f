use crate::domain::mailchimp::models::config::{ClientConfig, ClientConfigError};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub general: GeneralSettings,
    pub application: ApplicationSettings,
    pub mailchimp: MailchimpSettings,
}

impl Settings {
    pub fn log_level(&self) -> String {
        self.general.log_level.clone()
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct GeneralSettings {
    pub log_level: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub base_path: String,
    /// Directory receiving the raw webhook request records.
    /// Falls back to the system temporary directory.
    pub storage_dir: Option<PathBuf>,
    /// Read the client address from `Forwarded`/`X-Forwarded-For`.
    #[serde(default)]
    pub trust_proxy: bool,
}

impl ApplicationSettings {
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct MailchimpSettings {
    pub api_key: Secret<String>,
    pub default_list_id: Option<String>,
    #[serde(default = "default_true")]
    pub fail_on_remote_error: bool,
    #[serde(default = "default_true")]
    pub require_list_id: bool,
    pub base_url: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

fn default_true() -> bool {
    true
}

impl MailchimpSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client_config(&self) -> Result<ClientConfig, ClientConfigError> {
        ClientConfig::builder(self.api_key.expose_secret())
            .default_list_id(self.default_list_id.clone())
            .fail_on_remote_error(self.fail_on_remote_error)
            .require_list_id(self.require_list_id)
            .base_url(self.base_url.clone())
            .timeout(self.timeout())
            .build()
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings = config::Config::default();
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;

    // APP_MAILCHIMP__API_KEY=... overrides mailchimp.api_key
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    settings.try_into()
}
