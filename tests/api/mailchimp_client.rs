use mailchimp_integration::configuration::{get_configuration, MailchimpSettings};
use mailchimp_integration::domain::mailchimp::errors::MailchimpError;
use mailchimp_integration::domain::mailchimp::models::config::ClientConfigError;
use mailchimp_integration::domain::mailchimp::models::email::SubscriberEmail;
use mailchimp_integration::inbound::cli::build_client;
use secrecy::Secret;
use serde_json::{json, Map};
use wiremock::matchers::{any, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const A_X_COM_HASH: &str = "743173788aa9166801df2e18f0e7ff24";

fn settings(base_url: String) -> MailchimpSettings {
    let mut settings = get_configuration()
        .expect("Failed to read configuration")
        .mailchimp;
    settings.api_key = Secret::new("0123456789abcdef0123456789abcdef-us6".into());
    settings.base_url = Some(base_url);
    settings.default_list_id = Some("L1".into());
    settings
}

#[tokio::test]
async fn configured_client_subscribes_on_the_default_list() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/lists/L1/members/{}", A_X_COM_HASH)))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": A_X_COM_HASH,
            "email_address": "a@x.com",
            "status": "subscribed"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_client(&settings(mock_server.uri())).unwrap();
    let email = SubscriberEmail::parse("a@x.com".into()).unwrap();

    let member = client
        .subscribe_member(&email, Map::new(), None)
        .await
        .unwrap();

    assert_eq!(member["status"], "subscribed");
}

#[tokio::test]
async fn configured_client_surfaces_remote_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/lists/L1/members/{}", A_X_COM_HASH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": 404,
            "detail": "The requested resource could not be found."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_client(&settings(mock_server.uri())).unwrap();
    let email = SubscriberEmail::parse("a@x.com".into()).unwrap();

    let error = client.get_member(&email, None).await.unwrap_err();

    match error {
        MailchimpError::RemoteApi(result) => {
            assert_eq!(result.code(), 404);
            assert_eq!(result.message(), "The requested resource could not be found.");
            assert!(result.raw_result().is_some());
        }
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn missing_list_id_never_reaches_mailchimp() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut settings = settings(mock_server.uri());
    settings.default_list_id = None;
    let client = build_client(&settings).unwrap();

    let outcome = client.get_members(None).await;

    assert!(matches!(outcome, Err(MailchimpError::MissingListId)));
}

#[test]
fn shipped_configuration_requires_an_api_key() {
    let settings = get_configuration()
        .expect("Failed to read configuration")
        .mailchimp;

    if std::env::var("APP_MAILCHIMP__API_KEY").is_err() {
        assert!(matches!(
            settings.client_config(),
            Err(ClientConfigError::MissingApiKey)
        ));
        assert!(matches!(
            build_client(&settings),
            Err(MailchimpError::Configuration(ClientConfigError::MissingApiKey))
        ));
    }
}

#[test]
fn empty_api_key_is_rejected() {
    let mut settings = settings("http://127.0.0.1".into());
    settings.api_key = Secret::new("   ".into());

    assert!(matches!(
        settings.client_config(),
        Err(ClientConfigError::MissingApiKey)
    ));
}
