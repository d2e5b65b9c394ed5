//! End-to-end tests over real HTTP
//!
//! The axum API and a stand-in Ollama server are bound to ephemeral ports on
//! localhost. The database is deliberately unreachable, which exercises the
//! fail-soft paths without needing PostgreSQL.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use sql_bridge::config::{BridgeConfig, DatabaseConfig, LlmConfig};
use sql_bridge::llm::{Llm, OllamaClient};
use sql_bridge::prompt::{SqlGenerator, ERROR_PREFIX};
use sql_bridge::schema::Schema;
use sql_bridge::web::{create_router, AppState};

fn unreachable_db() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        connect_attempts: 1,
        retry_delay_ms: 0,
        ..DatabaseConfig::default()
    }
}

/// Serve `router` on an ephemeral port, returning its base URL
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A fake `/api/generate` that records request bodies and replies with `reply`
async fn spawn_fake_ollama(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let router = Router::new().route(
        "/api/generate",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().unwrap().push(body);
                (status, Json(reply))
            }
        }),
    );

    (spawn(router).await, seen)
}

fn llm_config(url: &str, timeout_secs: u64) -> LlmConfig {
    LlmConfig {
        url: url.to_string(),
        timeout_secs,
        ..LlmConfig::default()
    }
}

fn generator_for(url: &str) -> SqlGenerator {
    SqlGenerator::new(Arc::new(OllamaClient::new(&llm_config(url, 5)).unwrap()))
}

async fn spawn_api(ollama_url: &str) -> String {
    let config = BridgeConfig {
        database: unreachable_db(),
        llm: llm_config(ollama_url, 5),
        ..BridgeConfig::default()
    };
    spawn(create_router(AppState::with_generator(config, generator_for(ollama_url)))).await
}

#[tokio::test]
async fn ollama_request_wire_format() {
    let (url, seen) =
        spawn_fake_ollama(StatusCode::OK, json!({"response": "```sql\nSELECT 1;\n```"})).await;
    let client = OllamaClient::new(&llm_config(&url, 5)).unwrap();

    let raw = client.generate("PROMPT").await.unwrap();
    assert_eq!(raw, "```sql\nSELECT 1;\n```");

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "qwen2.5-coder:3b");
    assert_eq!(bodies[0]["prompt"], "PROMPT");
    assert_eq!(bodies[0]["stream"], false);
    assert_eq!(bodies[0]["options"]["num_predict"], 250);
    assert!((bodies[0]["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn generate_sql_returns_cleaned_text() {
    let (url, _) =
        spawn_fake_ollama(StatusCode::OK, json!({"response": "```sql\nSELECT 1;\n```"})).await;

    let sql = generator_for(&url).generate_sql(&Schema::default(), "one").await;
    assert_eq!(sql, "SELECT 1;");
}

#[tokio::test]
async fn generate_sql_non_success_status_is_error_comment() {
    let (url, _) =
        spawn_fake_ollama(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "no model"})).await;

    let sql = generator_for(&url).generate_sql(&Schema::default(), "one").await;
    assert!(sql.starts_with(ERROR_PREFIX), "got {:?}", sql);
    assert!(sql.contains("500"));
}

#[tokio::test]
async fn generate_sql_timeout_is_error_comment() {
    // Accepts connections but never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = OllamaClient::new(&llm_config(&url, 1)).unwrap();
    let generator = SqlGenerator::new(Arc::new(client));

    let sql = tokio::time::timeout(
        Duration::from_secs(10),
        generator.generate_sql(&Schema::default(), "anything"),
    )
    .await
    .expect("client timeout should fire first");

    assert!(sql.starts_with("-- Error"), "got {:?}", sql);
}

#[tokio::test]
async fn generate_sql_connection_refused_is_error_comment() {
    let sql = generator_for("http://127.0.0.1:1")
        .generate_sql(&Schema::default(), "anything")
        .await;
    assert!(sql.starts_with(ERROR_PREFIX));
}

#[tokio::test]
async fn health_reports_model() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "qwen2.5-coder:3b");
    assert_eq!(body["ollama_url"], "http://127.0.0.1:1");
}

#[tokio::test]
async fn schema_is_empty_list_when_database_is_down() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let response = reqwest::get(format!("{}/schema", base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn ddl_rejects_invalid_identifier() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("{}/ddl", base))
        .json(&json!({"action": "drop_table", "table_name": "users; DROP TABLE x"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not a valid identifier"));
}

#[tokio::test]
async fn chat_rejects_empty_message() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let response = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_reports_llm_failure_without_executing() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({"message": "how many users?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["sql"].as_str().unwrap().starts_with(ERROR_PREFIX));
    assert!(body["response"].as_str().unwrap().starts_with("Error"));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn chat_surfaces_execution_error() {
    let (ollama, _) =
        spawn_fake_ollama(StatusCode::OK, json!({"response": "SELECT * FROM users;"})).await;
    let base = spawn_api(&ollama).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({"message": "list users"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["sql"], "SELECT * FROM users;");
    assert!(body["response"].as_str().unwrap().starts_with("Error"));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn query_returns_error_object_when_database_is_down() {
    let base = spawn_api("http://127.0.0.1:1").await;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/query", base))
        .json(&json!({"sql": "SELECT 1;"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["error"].is_string());
}
