use md5::{Digest, Md5};
use validator::validate_email;

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<SubscriberEmail, EmailError> {
        let s = s.trim().to_string();
        if validate_email(&s) {
            Ok(Self(s))
        } else {
            Err(EmailError::InvalidSubscriber(format!(
                "{} is not a valid email",
                s
            )))
        }
    }

    /// Identifier of the member record on the remote side: hex MD5 of the
    /// lowercased address.
    pub fn subscriber_hash(&self) -> SubscriberHash {
        let digest = Md5::digest(self.0.to_lowercase().as_bytes());
        SubscriberHash(format!("{:x}", digest))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberHash(String);

impl AsRef<str> for SubscriberHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Invalid subscriber email: {0}")]
    InvalidSubscriber(String),
}
