mod support;

use axum::http::{Method, StatusCode};
use serde_json::Value;
use shared::models::{ChatMessage, Role};
use shared::prompts::{DOCTOR_SYSTEM_PROMPT, GREETING};

use support::api_app::build_test_app;
use support::gateway::TestGateway;
use support::http::{request, send_json};

#[tokio::test]
async fn new_session_starts_with_system_prompt_and_greeting() {
    let app = build_test_app(TestGateway::default()).await;

    let response = send_json(&app.router, request(Method::POST, "/session/new", None)).await;

    assert_eq!(response.status, StatusCode::OK);
    let session_id = response.body["session_id"]
        .as_str()
        .expect("session_id should be a string");
    assert!(uuid::Uuid::parse_str(session_id).is_ok());
    let messages = response.body["messages"]
        .as_array()
        .expect("messages should be an array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], DOCTOR_SYSTEM_PROMPT);
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], GREETING);
}

#[tokio::test]
async fn get_session_returns_live_messages() {
    let app = build_test_app(TestGateway::default()).await;
    let session = app.sessions().create();
    app.sessions()
        .append(&session.id, ChatMessage::user("I twisted my ankle"))
        .await
        .expect("append should succeed");

    let response = send_json(
        &app.router,
        request(Method::GET, &format!("/session/{}", session.id), None),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["session_id"], session.id.as_str());
    let messages: Vec<ChatMessage> =
        serde_json::from_value(response.body["messages"].clone()).expect("messages decode");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, Role::User);
    assert_eq!(messages[2].content, "I twisted my ankle");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = build_test_app(TestGateway::default()).await;

    let response = send_json(&app.router, request(Method::GET, "/session/unknown", None)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["code"], "not_found");
}

#[tokio::test]
async fn deleted_session_is_gone_and_second_delete_is_not_found() {
    let app = build_test_app(TestGateway::default()).await;
    let session = app.sessions().create();
    let uri = format!("/session/{}", session.id);

    let first_delete = send_json(&app.router, request(Method::DELETE, &uri, None)).await;
    assert_eq!(first_delete.status, StatusCode::OK);
    assert_eq!(first_delete.body["message"], "Session deleted successfully");

    let fetch = send_json(&app.router, request(Method::GET, &uri, None)).await;
    assert_eq!(fetch.status, StatusCode::NOT_FOUND);

    let second_delete = send_json(&app.router, request(Method::DELETE, &uri, None)).await;
    assert_eq!(second_delete.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saving_twice_writes_two_snapshots_listed_most_recent_first() {
    let app = build_test_app(TestGateway::default()).await;
    let session = app.sessions().create();
    let save_uri = format!("/session/{}/save", session.id);

    let first = send_json(&app.router, request(Method::POST, &save_uri, None)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["message"], "Session saved successfully");

    app.sessions()
        .append(&session.id, ChatMessage::user("still coughing"))
        .await
        .expect("append should succeed");

    let second = send_json(&app.router, request(Method::POST, &save_uri, None)).await;
    assert_eq!(second.status, StatusCode::OK);

    let first_file = first.body["filename"].as_str().expect("filename").to_string();
    let second_file = second.body["filename"].as_str().expect("filename").to_string();
    assert_ne!(first_file, second_file);

    let first_saved: Vec<ChatMessage> = read_saved(&app, &first_file).await;
    let second_saved: Vec<ChatMessage> = read_saved(&app, &second_file).await;
    assert_eq!(first_saved, session.messages);
    assert_eq!(second_saved.len(), 3);
    assert_eq!(second_saved[2], ChatMessage::user("still coughing"));

    let listed = send_json(&app.router, request(Method::GET, "/sessions", None)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let names: Vec<String> =
        serde_json::from_value(listed.body["sessions"].clone()).expect("sessions decode");
    assert_eq!(names, vec![second_file, first_file]);
}

#[tokio::test]
async fn saving_unknown_session_is_not_found() {
    let app = build_test_app(TestGateway::default()).await;

    let response = send_json(
        &app.router,
        request(Method::POST, "/session/unknown/save", None),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let listed = send_json(&app.router, request(Method::GET, "/sessions", None)).await;
    assert_eq!(listed.body["sessions"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn health_and_info_endpoints_respond() {
    let app = build_test_app(TestGateway::default()).await;

    let healthz = send_json(&app.router, request(Method::GET, "/healthz", None)).await;
    assert_eq!(healthz.status, StatusCode::OK);
    assert_eq!(healthz.body["ok"], true);

    let readyz = send_json(&app.router, request(Method::GET, "/readyz", None)).await;
    assert_eq!(readyz.status, StatusCode::OK);

    let info = send_json(&app.router, request(Method::GET, "/", None)).await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.body["message"], "Dr. HealBot API is running");
}

#[tokio::test]
async fn readyz_fails_when_storage_directory_disappears() {
    let app = build_test_app(TestGateway::default()).await;
    tokio::fs::remove_dir_all(app.archive().dir())
        .await
        .expect("sessions dir should be removed");

    let readyz = send_json(&app.router, request(Method::GET, "/readyz", None)).await;

    assert_eq!(readyz.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readyz.body["error"]["code"], "storage_unavailable");
}

async fn read_saved(app: &support::api_app::TestApp, filename: &str) -> Vec<ChatMessage> {
    let raw = tokio::fs::read(app.archive().dir().join(filename))
        .await
        .expect("saved file should exist");
    serde_json::from_slice(&raw).expect("saved file should be a message list")
}
