use crate::helpers::{spawn_app, spawn_app_behind_proxy, spawn_app_with};
use mailchimp_integration::domain::webhook::dispatcher::EventManager;
use mailchimp_integration::domain::webhook::event::WebhookEvent;
use serde_json::json;

#[tokio::test]
async fn webhook_returns_success_and_records_the_request() {
    let app = spawn_app().await;
    let body = "type=subscribe&fired_at=2009-03-26+21%3A35%3A57\
                &data%5Bid%5D=8a25ff1d98&data%5Blist_id%5D=a6b5da1054\
                &data%5Bemail%5D=api%40mailchimp.com&data%5Bmerges%5D%5BFNAME%5D=MailChimp";

    let response = app.post_webhook_form(body).await;

    assert_eq!(200, response.status().as_u16());
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome, json!({"success": true, "error": null}));

    let records = app.stored_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["data"]["type"], "subscribe");
    assert_eq!(records[0]["data"]["data"]["merges"]["FNAME"], "MailChimp");
    assert_eq!(records[0]["ip"], "127.0.0.1");
}

#[tokio::test]
async fn webhook_dispatches_a_namespaced_event() {
    let app = spawn_app().await;

    app.post_webhook_json(&json!({
        "type": "unsubscribe",
        "fired_at": "2024-01-01 00:00:00",
        "data": {"email": "a@x.com", "list_id": "L1", "id": "evt1"}
    }))
    .await;

    let events = app.handled_events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.name(), "Mailchimp.Webhook.unsubscribe");
    assert_eq!(event.event_time(), Some("2024-01-01 00:00:00"));
    assert_eq!(event.email().as_deref(), Some("a@x.com"));
    assert_eq!(event.list_id().as_deref(), Some("L1"));
    assert_eq!(event.event_id().as_deref(), Some("evt1"));
}

#[tokio::test]
async fn webhook_without_type_dispatches_the_generic_event() {
    let app = spawn_app().await;

    let response = app.post_webhook_form("data%5Bemail%5D=a%40x.com").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.handled_event_names(), vec!["Mailchimp.Webhook.event"]);
}

#[tokio::test]
async fn failing_handler_is_reported_in_the_body_and_the_request_still_recorded() {
    let event_manager = EventManager::new().on(
        "Mailchimp.Webhook.cleaned",
        |_: &WebhookEvent| -> Result<(), anyhow::Error> {
            Err(anyhow::anyhow!("Cleaned addresses cannot be synced"))
        },
    );
    let app = spawn_app_with(event_manager).await;

    let response = app
        .post_webhook_form("type=cleaned&data%5Bemail%5D=a%40x.com&data%5Breason%5D=hard")
        .await;

    assert_eq!(200, response.status().as_u16());
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        outcome,
        json!({"success": false, "error": "Cleaned addresses cannot be synced"})
    );
    assert_eq!(app.stored_records().len(), 1);
    // the failing handler was registered first, so the recorder never ran
    assert!(app.handled_event_names().is_empty());
}

#[tokio::test]
async fn every_delivery_gets_its_own_record() {
    let app = spawn_app().await;

    for event_type in ["subscribe", "profile", "unsubscribe"] {
        let response = app
            .post_webhook_json(&json!({"type": event_type, "data": {"email": "a@x.com"}}))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let records = app.stored_records();
    assert_eq!(records.len(), 3);
    let mut types: Vec<String> = records
        .iter()
        .map(|record| record["data"]["type"].as_str().unwrap().to_string())
        .collect();
    types.sort();
    assert_eq!(types, vec!["profile", "subscribe", "unsubscribe"]);
}

#[tokio::test]
async fn malformed_body_is_still_answered_and_recorded() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(&format!("{}{}/webhook", app.address, app.base_path))
        .header("Content-Type", "application/json")
        .body("{broken")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["success"], true);
    assert_eq!(app.stored_records()[0]["data"], "{broken");
    assert_eq!(app.handled_event_names(), vec!["Mailchimp.Webhook.event"]);
}

#[tokio::test]
async fn webhook_url_validation_probe_returns_200() {
    let app = spawn_app().await;

    let response = app.get_webhook().await;

    assert_eq!(200, response.status().as_u16());
    assert!(app.stored_records().is_empty());
}

#[tokio::test]
async fn forwarded_for_header_is_ignored_by_default() {
    let app = spawn_app().await;

    app.post_webhook_form_forwarded_for("type=subscribe", "203.0.113.7")
        .await;

    let records = app.stored_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["ip"], "127.0.0.1");
}

#[tokio::test]
async fn forwarded_for_header_is_used_behind_a_trusted_proxy() {
    let app = spawn_app_behind_proxy().await;

    app.post_webhook_form_forwarded_for("type=subscribe", "203.0.113.7")
        .await;

    assert_eq!(app.stored_records()[0]["ip"], "203.0.113.7");
}
