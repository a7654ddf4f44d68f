use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
pub enum ClientConfigError {
    #[error("MailChimp api requires an api key")]
    MissingApiKey,
    #[error("Invalid MailChimp api key supplied: {0}")]
    InvalidApiKey(String),
}

/// Immutable settings of an [`ApiClient`](crate::outbound::mailchimp::client::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: Secret<String>,
    default_list_id: Option<String>,
    fail_on_remote_error: bool,
    require_list_id: bool,
    base_url: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    pub fn builder(api_key: &str) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_key: api_key.trim().to_string(),
            default_list_id: None,
            fail_on_remote_error: true,
            require_list_id: true,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn api_key(&self) -> &Secret<String> {
        &self.api_key
    }

    pub fn default_list_id(&self) -> Option<&str> {
        self.default_list_id.as_deref()
    }

    pub fn fail_on_remote_error(&self) -> bool {
        self.fail_on_remote_error
    }

    pub fn require_list_id(&self) -> bool {
        self.require_list_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Root of the versioned REST API.
    ///
    /// Without an explicit override the datacenter is read from the api key
    /// suffix, `<key>-us6` targets `https://us6.api.mailchimp.com/3.0`.
    pub fn api_endpoint(&self) -> Result<String, ClientConfigError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.trim_end_matches('/').to_string());
        }
        match self.api_key.expose_secret().rsplit_once('-') {
            Some((_, datacenter)) if is_datacenter(datacenter) => {
                Ok(format!("https://{}.api.mailchimp.com/3.0", datacenter))
            }
            _ => Err(ClientConfigError::InvalidApiKey(
                "the key carries no datacenter suffix".into(),
            )),
        }
    }
}

fn is_datacenter(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

pub struct ClientConfigBuilder {
    api_key: String,
    default_list_id: Option<String>,
    fail_on_remote_error: bool,
    require_list_id: bool,
    base_url: Option<String>,
    timeout: Duration,
}

impl ClientConfigBuilder {
    pub fn default_list_id(mut self, list_id: Option<String>) -> Self {
        self.default_list_id = list_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn fail_on_remote_error(mut self, enabled: bool) -> Self {
        self.fail_on_remote_error = enabled;
        self
    }

    pub fn require_list_id(mut self, enabled: bool) -> Self {
        self.require_list_id = enabled;
        self
    }

    pub fn base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        if self.api_key.is_empty() {
            return Err(ClientConfigError::MissingApiKey);
        }
        Ok(ClientConfig {
            api_key: Secret::new(self.api_key),
            default_list_id: self.default_list_id,
            fail_on_remote_error: self.fail_on_remote_error,
            require_list_id: self.require_list_id,
            base_url: self.base_url,
            timeout: self.timeout,
        })
    }
}
