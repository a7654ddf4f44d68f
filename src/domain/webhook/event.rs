use serde_json::{Map, Value};

/// Event wrapper around a Mailchimp webhook delivery.
///
/// Construction never fails: missing or malformed parts of the payload fall
/// back to `event` for the type, no firing time and an empty data map.
///
/// <https://mailchimp.com/developer/marketing/guides/sync-audience-data-webhooks/>
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    name: String,
    fired_at: Option<String>,
    data: Map<String, Value>,
}

impl WebhookEvent {
    pub const NAMESPACE: &'static str = "Mailchimp.Webhook.";
    const DEFAULT_TYPE: &'static str = "event";

    pub fn from_payload(payload: &Value) -> Self {
        let event_type = payload
            .get("type")
            .and_then(scalar_as_string)
            .unwrap_or_else(|| Self::DEFAULT_TYPE.to_string());
        let fired_at = payload.get("fired_at").and_then(scalar_as_string);
        let data = match payload.get("data") {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        };

        Self {
            name: format!("{}{}", Self::NAMESPACE, event_type),
            fired_at,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The webhook type, i.e. the event name without its namespace.
    pub fn kind(&self) -> &str {
        self.name
            .strip_prefix(Self::NAMESPACE)
            .unwrap_or(&self.name)
    }

    pub fn event_type(&self) -> Option<WebhookEventType> {
        self.kind().parse().ok()
    }

    /// When Mailchimp fired the event, as sent (`YYYY-MM-DD HH:MM:SS`).
    pub fn event_time(&self) -> Option<&str> {
        self.fired_at.as_deref()
    }

    pub fn event_id(&self) -> Option<String> {
        self.field("id")
    }

    /// Mailchimp internal member id.
    pub fn member_id(&self) -> Option<String> {
        self.field("web_id")
    }

    pub fn list_id(&self) -> Option<String> {
        self.field("list_id")
    }

    pub fn email(&self) -> Option<String> {
        self.field("email")
    }

    /// `html` or `text`.
    pub fn email_format(&self) -> Option<String> {
        self.field("email_type")
    }

    pub fn reason(&self) -> Option<String> {
        self.field("reason")
    }

    pub fn old_email(&self) -> Option<String> {
        self.field("old_email")
    }

    pub fn new_email(&self) -> Option<String> {
        self.field("new_email")
    }

    pub fn merges(&self) -> Option<&Map<String, Value>> {
        self.data.get("merges").and_then(Value::as_object)
    }

    /// Alias of [`WebhookEvent::member_id`].
    pub fn mailchimp_member_id(&self) -> Option<String> {
        self.member_id()
    }

    /// Alias of [`WebhookEvent::list_id`].
    pub fn mailchimp_list_id(&self) -> Option<String> {
        self.list_id()
    }

    fn field(&self, key: &str) -> Option<String> {
        self.data.get(key).and_then(scalar_as_string)
    }
}

fn scalar_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Unknown webhook type: {0}")]
pub struct UnknownWebhookType(String);

/// Webhook types Mailchimp sends for list activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventType {
    Subscribe,
    Unsubscribe,
    Profile,
    EmailChanged,
    Cleaned,
    Campaign,
}

impl std::str::FromStr for WebhookEventType {
    type Err = UnknownWebhookType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribe" => Ok(Self::Subscribe),
            "unsubscribe" => Ok(Self::Unsubscribe),
            "profile" => Ok(Self::Profile),
            "upemail" => Ok(Self::EmailChanged),
            "cleaned" => Ok(Self::Cleaned),
            "campaign" => Ok(Self::Campaign),
            other => Err(UnknownWebhookType(other.into())),
        }
    }
}
