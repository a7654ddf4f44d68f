use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug)]
pub enum MemberStatusError {
    #[error("Unknown member status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Subscribed,
    Pending,
    Unsubscribed,
    Cleaned,
}

impl MemberStatus {
    const SUBSCRIBED: &'static str = "subscribed";
    const PENDING: &'static str = "pending";
    const UNSUBSCRIBED: &'static str = "unsubscribed";
    const CLEANED: &'static str = "cleaned";

    pub fn parse(status: &str) -> Result<MemberStatus, MemberStatusError> {
        match status {
            Self::SUBSCRIBED => Ok(MemberStatus::Subscribed),
            Self::PENDING => Ok(MemberStatus::Pending),
            Self::UNSUBSCRIBED => Ok(MemberStatus::Unsubscribed),
            Self::CLEANED => Ok(MemberStatus::Cleaned),
            _ => Err(MemberStatusError::UnknownStatus(status.into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Subscribed => Self::SUBSCRIBED,
            MemberStatus::Pending => Self::PENDING,
            MemberStatus::Unsubscribed => Self::UNSUBSCRIBED,
            MemberStatus::Cleaned => Self::CLEANED,
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = MemberStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberStatus::parse(s)
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MemberStatus> for Value {
    fn from(status: MemberStatus) -> Self {
        Value::String(status.as_str().into())
    }
}

/// Body of a subscribe upsert. Layering order, last one wins:
/// `{status: subscribed}`, then the caller's fields, then `email_address`.
pub fn subscription_payload(email: &str, data: Map<String, Value>) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("status".into(), MemberStatus::Subscribed.into());
    payload.extend(data);
    payload.insert("email_address".into(), Value::String(email.into()));
    payload
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Member {
    pub id: String,
    pub email_address: String,
    pub status: String,
    #[serde(default)]
    pub merge_fields: Map<String, Value>,
}

impl Member {
    pub fn merge_field(&self, key: &str) -> &str {
        self.merge_fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MemberCollection {
    pub members: Vec<Member>,
    #[serde(default)]
    pub total_items: u64,
}
