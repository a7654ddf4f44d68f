//! Operator commands over [`ApiClient`], one subcommand per client operation.

use crate::configuration::MailchimpSettings;
use crate::domain::mailchimp::{
    errors::MailchimpError,
    models::{
        email::SubscriberEmail,
        list::ListCollection,
        member::{MemberCollection, MemberStatus},
    },
    ports::MailchimpTransport,
};
use crate::outbound::mailchimp::client::ApiClient;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::io::Write;

/// `mailchimp` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mailchimp",
    about = "Inspect and manage Mailchimp lists and their subscribers",
    version
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
    /// Mailchimp list ID. Falls back to the configured default list.
    #[arg(long, global = true, value_name = "id")]
    pub list: Option<String>,
    /// Subscriber email.
    #[arg(long, global = true, value_name = "address")]
    pub email: Option<String>,
    /// Subscriber first name, stored in the `FNAME` merge field.
    #[arg(long, global = true)]
    pub name: Option<String>,
    /// Subscriber status: subscribed, pending, unsubscribed or cleaned.
    #[arg(long, global = true)]
    pub status: Option<MemberStatus>,
    /// Number of maximum response items.
    #[arg(long, global = true, default_value_t = 10)]
    pub limit: u32,
    /// Number of response items to skip.
    #[arg(long, global = true, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all mailchimp lists
    Lists,
    /// List all subscribers for a list
    Subscribers,
    /// Show a subscriber of a list
    #[command(name = "getSubscriber", alias = "get-subscriber")]
    GetSubscriber,
    /// Add subscriber to list
    Subscribe,
    /// Unsubscribe subscriber from list
    Unsubscribe,
    /// Remove subscriber from list
    #[command(name = "removeSubscriber", alias = "remove-subscriber")]
    RemoveSubscriber,
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Subscriber email missing, use `--email`")]
    MissingEmail,
    #[error(transparent)]
    Mailchimp(#[from] MailchimpError),
    #[error("{0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn build_client(settings: &MailchimpSettings) -> Result<ApiClient, MailchimpError> {
    let config = settings.client_config()?;
    ApiClient::new(config)
}

pub async fn run<T, W>(args: &CliArgs, client: &ApiClient<T>, out: &mut W) -> Result<(), CliError>
where
    T: MailchimpTransport,
    W: Write,
{
    let list_id = args.list.as_deref();

    match args.command {
        Command::Lists => {
            let lists: ListCollection = serde_json::from_value(client.get_lists().await?)
                .map_err(|_| CliError::UnexpectedResponse("Failed to fetch lists".into()))?;
            writeln!(out, "Found {} lists", lists.lists.len())?;
            for list in lists.lists {
                writeln!(out, "{}:{}", list.id, list.name)?;
            }
        }
        Command::Subscribers => {
            let response = client
                .get_members_page(list_id, args.limit, args.offset)
                .await?;
            let subscribers: MemberCollection = serde_json::from_value(response)
                .map_err(|_| CliError::UnexpectedResponse("Failed to fetch subscribers".into()))?;
            writeln!(
                out,
                "Found {} of {} subscribers",
                subscribers.members.len(),
                subscribers.total_items
            )?;
            for s in subscribers.members {
                writeln!(
                    out,
                    "> {}:{}:{}:{}:{}",
                    s.id,
                    s.email_address,
                    s.status,
                    s.merge_field("FNAME"),
                    s.merge_field("LNAME")
                )?;
            }
        }
        Command::GetSubscriber => {
            let email = email(args)?;
            let result = client.get_member(&email, list_id).await?;
            print_json(out, &result)?;
        }
        Command::Subscribe => {
            let email = email(args)?;
            let result = client
                .subscribe_member(&email, subscription_data(args), list_id)
                .await?;
            print_json(out, &result)?;
        }
        Command::Unsubscribe => {
            let email = email(args)?;
            let result = client.unsubscribe_member(&email, list_id).await?;
            print_json(out, &result)?;
        }
        Command::RemoveSubscriber => {
            let email = email(args)?;
            let result = client.delete_member(&email, list_id).await?;
            print_json(out, &result)?;
        }
    }
    Ok(())
}

/// Remote failures print as `[code] message` followed by the raw envelope.
pub fn report<W: Write>(error: &CliError, out: &mut W) -> std::io::Result<()> {
    match error {
        CliError::Mailchimp(MailchimpError::RemoteApi(result)) => {
            writeln!(out, "[{}] {}", result.code(), result.message())?;
            if let Some(raw) = result.raw_result() {
                print_json(out, raw)?;
            }
            Ok(())
        }
        other => writeln!(out, "{}", other),
    }
}

fn email(args: &CliArgs) -> Result<SubscriberEmail, CliError> {
    let email = args.email.clone().ok_or(CliError::MissingEmail)?;
    SubscriberEmail::parse(email).map_err(|e| CliError::Mailchimp(e.into()))
}

fn subscription_data(args: &CliArgs) -> Map<String, Value> {
    let mut data = Map::new();
    if let Some(name) = &args.name {
        data.insert("merge_fields".into(), json!({ "FNAME": name }));
    }
    if let Some(status) = args.status {
        data.insert("status".into(), status.into());
    }
    data
}

fn print_json<W: Write>(out: &mut W, value: &Value) -> std::io::Result<()> {
    match value {
        Value::Null => writeln!(out, "OK"),
        value => {
            let pretty = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
            writeln!(out, "{}", pretty)
        }
    }
}
