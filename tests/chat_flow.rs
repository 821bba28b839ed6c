use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use aggregator_bot::aggregator::{AggregatorError, Role};
use aggregator_bot::commands::converse;
use aggregator_bot::config::Config;
use aggregator_bot::health::StatusBoard;
use aggregator_bot::session::{SessionKey, HISTORY_CAP};
use aggregator_bot::Data;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

async fn completions(Json(body): Json<Value>) -> impl IntoResponse {
    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let last = messages
        .last()
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();

    if last.contains("explode") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "rate limited"}})),
        );
    }
    if last.contains("essay") {
        return (
            StatusCode::OK,
            Json(json!({"choices": [{"message": {"role": "assistant", "content": "word ".repeat(900)}}]})),
        );
    }

    let reply = format!("echo {last} ({} messages, model {})", messages.len(), body["model"]);
    (
        StatusCode::OK,
        Json(json!({"choices": [{"message": {"role": "assistant", "content": reply}}]})),
    )
}

async fn spawn_aggregator() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/v1/chat/completions", post(completions));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn data_for(addr: SocketAddr) -> Data {
    let env: HashMap<&str, String> = HashMap::from([
        ("DISCORD_BOT_TOKEN", "token".to_string()),
        ("G4F_BASE_URL", format!("http://{addr}/")),
        ("CHAT_MODEL", "gpt-4o-mini".to_string()),
    ]);
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    Data::new(&config, Arc::new(StatusBoard::new()))
}

#[tokio::test]
async fn test_conversation_keeps_both_sides() {
    let addr = spawn_aggregator().await;
    let data = data_for(addr);

    let reply = converse(&data, 7, "hello").await.unwrap();
    assert_eq!(reply, vec!["echo hello (1 messages, model \"gpt-4o-mini\")"]);

    let reply = converse(&data, 7, "again").await.unwrap();
    assert_eq!(reply.len(), 1);
    assert!(reply[0].starts_with("echo again (3 messages"));

    let history = data.sessions.get_history(SessionKey::User(7));
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_history_is_capped() {
    let addr = spawn_aggregator().await;
    let data = data_for(addr);

    for i in 0..8 {
        converse(&data, 1, &format!("question {i}")).await.unwrap();
    }

    let history = data.sessions.get_history(SessionKey::User(1));
    assert_eq!(history.len(), HISTORY_CAP);
    assert_eq!(history[0].content, "question 3");
}

#[tokio::test]
async fn test_users_do_not_share_history() {
    let addr = spawn_aggregator().await;
    let data = data_for(addr);

    converse(&data, 1, "from one").await.unwrap();
    converse(&data, 2, "from two").await.unwrap();

    let one = data.sessions.get_history(SessionKey::User(1));
    assert_eq!(one.len(), 2);
    assert_eq!(one[0].content, "from one");
}

#[tokio::test]
async fn test_failure_keeps_question_in_history() {
    let addr = spawn_aggregator().await;
    let data = data_for(addr);

    let err = converse(&data, 3, "please explode").await.unwrap_err();
    match err {
        AggregatorError::Api(msg) => assert_eq!(msg, "rate limited"),
        other => panic!("unexpected error: {other:?}"),
    }
    let history = data.sessions.get_history(SessionKey::User(3));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::User);
}

#[tokio::test]
async fn test_long_reply_is_chunked() {
    let addr = spawn_aggregator().await;
    let data = data_for(addr);

    let chunks = converse(&data, 4, "write an essay").await.unwrap();
    assert!(chunks.len() >= 3);
    assert!(chunks.iter().all(|c| c.chars().count() <= 2000));
}

#[tokio::test]
async fn test_unreachable_aggregator_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let data = data_for(addr);

    let err = converse(&data, 5, "anyone there?").await.unwrap_err();
    assert!(matches!(err, AggregatorError::Http(_)));
}
