use async_trait::async_trait;
use serde_json::Value;

use super::errors::MailchimpError;

/// The generic verbs of the Mailchimp REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }
}

impl std::str::FromStr for Verb {
    type Err = MailchimpError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action.to_ascii_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "patch" => Ok(Verb::Patch),
            "delete" => Ok(Verb::Delete),
            _ => Err(MailchimpError::UnknownOperation(action.into())),
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single remote call.
///
/// `last_error` is set whenever the call failed, either at the network level
/// or because the service answered with an error status. `body` then holds
/// whatever was decoded, usually the error envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportReply {
    pub body: Value,
    pub last_error: Option<String>,
}

impl TransportReply {
    pub fn success(body: Value) -> Self {
        Self {
            body,
            last_error: None,
        }
    }

    pub fn failure(body: Value, last_error: impl Into<String>) -> Self {
        Self {
            body,
            last_error: Some(last_error.into()),
        }
    }
}

#[async_trait]
pub trait MailchimpTransport: Send + Sync + 'static {
    /// Issues `verb` against `path`, relative to the versioned API root.
    /// GET sends `args` as query parameters, every other verb as a JSON body.
    async fn call(&self, verb: Verb, path: &str, args: &Value) -> TransportReply;
}
