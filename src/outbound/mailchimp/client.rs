use crate::domain::mailchimp::{
    errors::{ErrorResult, MailchimpError},
    models::{
        config::ClientConfig,
        email::SubscriberEmail,
        list::ListId,
        member::{subscription_payload, MemberStatus},
    },
    ports::{MailchimpTransport, TransportReply, Verb},
};
use crate::outbound::mailchimp::transport::HttpTransport;
use serde_json::{json, Map, Value};

/// List-scoped access to the Mailchimp API.
///
/// Every remote call goes through [`ApiClient::call`], which turns a
/// transport-reported failure into [`MailchimpError::RemoteApi`] when
/// `fail_on_remote_error` is enabled. With the flag disabled the decoded
/// reply, error envelope included, is handed back as is.
#[derive(Debug)]
pub struct ApiClient<T: MailchimpTransport = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, MailchimpError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: MailchimpTransport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Picks the list an operation works on: a non-empty `explicit` id,
    /// otherwise the configured default. Only a missing id under
    /// `require_list_id` is an error; otherwise the empty id is passed on and
    /// the remote side rejects the call.
    pub fn resolve_list_id(&self, explicit: Option<&str>) -> Result<ListId, MailchimpError> {
        let resolved = explicit
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| self.config.default_list_id());

        match resolved {
            Some(id) => Ok(ListId::new(id)),
            None if self.config.require_list_id() => Err(MailchimpError::MissingListId),
            None => Ok(ListId::new("")),
        }
    }

    pub async fn call(&self, verb: Verb, path: &str, args: Value) -> Result<Value, MailchimpError> {
        tracing::debug!(
            action = %verb,
            path,
            args = ?argument_keys(&args),
            "Forwarding call to Mailchimp"
        );
        let reply = self.transport.call(verb, path, &args).await;
        self.unwrap_reply(reply)
    }

    /// Same as [`ApiClient::call`] for callers holding the action as text.
    pub async fn call_named(
        &self,
        action: &str,
        path: &str,
        args: Value,
    ) -> Result<Value, MailchimpError> {
        let verb: Verb = action.parse()?;
        self.call(verb, path, args).await
    }

    pub async fn get(&self, path: &str, args: Value) -> Result<Value, MailchimpError> {
        self.call(Verb::Get, path, args).await
    }

    pub async fn post(&self, path: &str, args: Value) -> Result<Value, MailchimpError> {
        self.call(Verb::Post, path, args).await
    }

    pub async fn put(&self, path: &str, args: Value) -> Result<Value, MailchimpError> {
        self.call(Verb::Put, path, args).await
    }

    pub async fn patch(&self, path: &str, args: Value) -> Result<Value, MailchimpError> {
        self.call(Verb::Patch, path, args).await
    }

    pub async fn delete(&self, path: &str, args: Value) -> Result<Value, MailchimpError> {
        self.call(Verb::Delete, path, args).await
    }

    #[tracing::instrument(name = "Fetching Mailchimp lists", skip(self))]
    pub async fn get_lists(&self) -> Result<Value, MailchimpError> {
        self.get("lists", Value::Null).await
    }

    #[tracing::instrument(name = "Fetching list signup forms", skip(self))]
    pub async fn get_list_signup_forms(
        &self,
        list_id: Option<&str>,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.get(&format!("lists/{}/signup-forms", list_id), Value::Null)
            .await
    }

    #[tracing::instrument(name = "Fetching list members", skip(self))]
    pub async fn get_members(&self, list_id: Option<&str>) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.get(&members_path(&list_id), Value::Null).await
    }

    #[tracing::instrument(name = "Fetching a page of list members", skip(self))]
    pub async fn get_members_page(
        &self,
        list_id: Option<&str>,
        count: u32,
        offset: u32,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.get(
            &members_path(&list_id),
            json!({"count": count, "offset": offset}),
        )
        .await
    }

    #[tracing::instrument(
        name = "Fetching a list member",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn get_member(
        &self,
        email: &SubscriberEmail,
        list_id: Option<&str>,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.get(&member_path(&list_id, email), Value::Null).await
    }

    /// Creates or updates the member keyed by the subscriber hash, so
    /// repeating the call never produces a second record for the address.
    #[tracing::instrument(
        name = "Subscribing a list member",
        skip(self, email, data),
        fields(subscriber_email = %email)
    )]
    pub async fn subscribe_member(
        &self,
        email: &SubscriberEmail,
        data: Map<String, Value>,
        list_id: Option<&str>,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        let payload = subscription_payload(email.as_ref(), data);
        self.put(&member_path(&list_id, email), Value::Object(payload))
            .await
    }

    #[tracing::instrument(
        name = "Unsubscribing a list member",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn unsubscribe_member(
        &self,
        email: &SubscriberEmail,
        list_id: Option<&str>,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.patch(
            &member_path(&list_id, email),
            json!({"status": MemberStatus::Unsubscribed}),
        )
        .await
    }

    #[tracing::instrument(
        name = "Removing a list member",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn delete_member(
        &self,
        email: &SubscriberEmail,
        list_id: Option<&str>,
    ) -> Result<Value, MailchimpError> {
        let list_id = self.resolve_list_id(list_id)?;
        self.delete(&member_path(&list_id, email), Value::Null).await
    }

    fn unwrap_reply(&self, reply: TransportReply) -> Result<Value, MailchimpError> {
        if self.config.fail_on_remote_error() {
            if let Some(last_error) = reply.last_error.filter(|e| !e.is_empty()) {
                let raw_result = Some(reply.body).filter(|body| !body.is_null());
                return Err(ErrorResult::new(last_error, raw_result).into());
            }
        }
        Ok(reply.body)
    }
}

fn members_path(list_id: &ListId) -> String {
    format!("lists/{}/members", list_id)
}

fn member_path(list_id: &ListId, email: &SubscriberEmail) -> String {
    format!("lists/{}/members/{}", list_id, email.subscriber_hash())
}

/// Argument names only, values may carry subscriber data.
fn argument_keys(args: &Value) -> Vec<&str> {
    match args {
        Value::Object(map) => map.keys().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}
