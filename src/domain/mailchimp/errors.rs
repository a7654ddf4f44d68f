use crate::domain::mailchimp::models::{config::ClientConfigError, email::EmailError};
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum MailchimpError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ClientConfigError),
    #[error("Dependency missing: {0}")]
    DependencyMissing(String),
    #[error("Mailchimp list ID not specified")]
    MissingListId,
    #[error(transparent)]
    RemoteApi(#[from] ErrorResult),
    #[error("Unknown method: {0}")]
    UnknownOperation(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<EmailError> for MailchimpError {
    fn from(value: EmailError) -> Self {
        Self::ValidationError(value.to_string())
    }
}

/// A call the remote service reported as failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[{code}] {message}")]
pub struct ErrorResult {
    message: String,
    code: i64,
    raw_result: Option<Value>,
}

impl ErrorResult {
    /// Builds the failure from the transport's last-error text and the
    /// decoded body of the failed call. The envelope's `status` and `detail`
    /// take precedence over the defaults.
    pub fn new(last_error: impl Into<String>, raw_result: Option<Value>) -> Self {
        let mut message = last_error.into();
        let mut code = 0;

        if let Some(Value::Object(envelope)) = &raw_result {
            if let Some(status) = envelope.get("status").and_then(status_code) {
                code = status;
            }
            if let Some(detail) = envelope.get("detail").and_then(Value::as_str) {
                message = detail.to_string();
            }
        }

        Self {
            message,
            code,
            raw_result,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn raw_result(&self) -> Option<&Value> {
        self.raw_result.as_ref()
    }
}

fn status_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
