mod common;

use axum_test::TestServer;
use common::{client_for, mount_completion, tool_completion};
use order_desk::orders::OrderStatus;
use order_desk::session::Session;
use order_desk::web_server::{build_router, handle_client_text, AppState, ServerEvent};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_index_page_renders_fresh_session() {
    let mock = MockServer::start().await;
    let state = AppState::new(client_for(&mock)).unwrap();
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("Customer Support Agent"));
    assert!(html.contains("Current Orders"));
    assert!(html.contains("ORD-1001"));
    assert!(html.contains("49.99"));
    assert!(html.contains("Hello! How can I help you today?"));
    // Rendering the page never talks to the model
    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let mock = MockServer::start().await;
    let state = AppState::new(client_for(&mock)).unwrap();
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server.get("/nope").await;
    response.assert_status_not_found();
}

#[test_log::test(tokio::test)]
async fn test_user_message_yields_reply_then_orders() {
    let mock = MockServer::start().await;
    mount_completion(&mock, tool_completion(&[("place_order", r#"{"total": 12.5}"#)])).await;
    let llm = client_for(&mock);

    let mut session = Session::new();
    let events = handle_client_text(
        &mut session,
        &llm,
        r#"{"type":"user_message","content":"buy something for 12.50"}"#,
    )
    .await;

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        ServerEvent::Reply { content: "✅ Order ORD-1004 placed with total $12.50.".to_string() }
    );
    match &events[1] {
        ServerEvent::Orders { orders } => {
            assert_eq!(orders.len(), 4);
            assert_eq!(orders[3].order_id, "ORD-1004");
            assert_eq!(orders[3].status, OrderStatus::Processing);
        }
        other => panic!("Expected Orders event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let mock = MockServer::start().await;
    let llm = client_for(&mock);

    let mut session = Session::new();
    let events = handle_client_text(&mut session, &llm, r#"{"type":"user_message","content":"   "}"#).await;

    assert!(events.is_empty());
    assert_eq!(session.conversation.len(), 2);
    assert!(mock.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_frame_gets_error_event() {
    let mock = MockServer::start().await;
    let llm = client_for(&mock);

    let mut session = Session::new();
    let events = handle_client_text(&mut session, &llm, "not json at all").await;

    assert_eq!(events, vec![ServerEvent::Error { message: "Unrecognised message.".to_string() }]);
}

#[test_log::test(tokio::test)]
async fn test_model_failure_gets_error_event_and_session_survives() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock)
        .await;
    let llm = client_for(&mock);

    let mut session = Session::new();
    let events = handle_client_text(&mut session, &llm, r#"{"type":"user_message","content":"hello"}"#).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ServerEvent::Error { .. }));
    assert_eq!(session.conversation.len(), 2);
    assert_eq!(session.orders.len(), 3);
}
