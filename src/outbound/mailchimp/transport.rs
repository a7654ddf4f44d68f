use crate::domain::mailchimp::{
    errors::MailchimpError,
    models::config::ClientConfig,
    ports::{MailchimpTransport, TransportReply, Verb},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;

const UNKNOWN_ERROR: &str = "Unknown error, inspect the raw response for details";

/// Mailchimp v3 REST API over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl HttpTransport {
    pub fn new(configuration: &ClientConfig) -> Result<Self, MailchimpError> {
        let base_url = configuration.api_endpoint()?;
        let http_client = Client::builder()
            .timeout(configuration.timeout())
            .build()
            .map_err(|e| {
                MailchimpError::DependencyMissing(format!("HTTP client unavailable: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url,
            api_key: configuration.api_key().clone(),
        })
    }

    fn request(&self, verb: Verb, path: &str, args: &Value) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = match verb {
            Verb::Get => self.http_client.get(&url).query(&query_pairs(args)),
            Verb::Post => with_json(self.http_client.post(&url), args),
            Verb::Put => with_json(self.http_client.put(&url), args),
            Verb::Patch => with_json(self.http_client.patch(&url), args),
            Verb::Delete => with_json(self.http_client.delete(&url), args),
        };
        builder.basic_auth("apikey", Some(self.api_key.expose_secret()))
    }
}

#[async_trait]
impl MailchimpTransport for HttpTransport {
    #[tracing::instrument(name = "Calling the Mailchimp API", skip(self, args))]
    async fn call(&self, verb: Verb, path: &str, args: &Value) -> TransportReply {
        let response = match self.request(verb, path, args).send().await {
            Ok(response) => response,
            Err(e) => return TransportReply::failure(Value::Null, e.to_string()),
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return TransportReply::failure(Value::Null, e.to_string()),
        };
        let body = decode_body(text);

        if status.is_success() {
            return TransportReply::success(body);
        }

        let last_error = match body.get("detail").and_then(Value::as_str) {
            Some(detail) => format!("{}: {}", status.as_u16(), detail),
            None => UNKNOWN_ERROR.to_string(),
        };
        tracing::warn!(status = status.as_u16(), %last_error, "Mailchimp reported an error");
        TransportReply::failure(body, last_error)
    }
}

fn with_json(builder: RequestBuilder, args: &Value) -> RequestBuilder {
    if args.is_null() {
        builder
    } else {
        builder.json(args)
    }
}

fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn query_pairs(args: &Value) -> Vec<(String, String)> {
    match args {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => (k.clone(), s.clone()),
                other => (k.clone(), other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}
