//! OpenRouter client tests against a mock HTTP server.

use renamegenie::config::AppConfig;
use renamegenie::error::ApiError;
use renamegenie::provider::OpenRouterClient;
use renamegenie::run::RunState;
use renamegenie::service::RenameService;
use serde_json::json;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(temp: &TempDir, endpoint: String) -> AppConfig {
    let root = temp.path().join("workspace");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();

    let mut config = AppConfig::default();
    config.workspace_path = root;
    config.openrouter_api_key = Some("sk-test".to_string());
    config.openrouter_endpoint = endpoint;
    config.logging.run_log_dir = temp.path().join("logs");
    config
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn successful_mapping_advances_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
            r#"[{"original": "workspace/a.txt", "new": "workspace/alpha.txt"}]"#,
        )))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&temp, server.uri());
    let provider = OpenRouterClient::from_config(&config).unwrap();
    let service = RenameService::new(config, Box::new(provider)).unwrap();

    let scan = service.scan().unwrap();
    let mapping = service.preview(&scan.run_id, "greek letters").await.unwrap();
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping[0].new, "workspace/alpha.txt");
    assert_eq!(
        service.registry().state(&scan.run_id),
        Some(RunState::Mapped)
    );
}

#[tokio::test]
async fn server_error_leaves_run_scanned_and_retryable() {
    let server = MockServer::start().await;
    // First call fails, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("[]")))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&temp, server.uri());
    let provider = OpenRouterClient::from_config(&config).unwrap();
    let service = RenameService::new(config, Box::new(provider)).unwrap();

    let scan = service.scan().unwrap();
    let err = service.preview(&scan.run_id, "tidy").await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteCall(_)));
    assert_eq!(
        service.registry().state(&scan.run_id),
        Some(RunState::Scanned)
    );

    // Same run identifier, retried.
    service.preview(&scan.run_id, "tidy").await.unwrap();
    assert_eq!(
        service.registry().state(&scan.run_id),
        Some(RunState::Mapped)
    );
}

#[tokio::test]
async fn non_json_model_reply_fails_the_mapping_stage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("I renamed everything, you're welcome!")),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&temp, server.uri());
    let provider = OpenRouterClient::from_config(&config).unwrap();
    let service = RenameService::new(config, Box::new(provider)).unwrap();

    let scan = service.scan().unwrap();
    let err = service.preview(&scan.run_id, "tidy").await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteCall(_)));
    assert_eq!(
        service.registry().state(&scan.run_id),
        Some(RunState::Scanned)
    );
}

#[tokio::test]
async fn timeout_is_a_remote_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("[]"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = config_for(&temp, server.uri());
    config.request_timeout_secs = 1;
    let provider = OpenRouterClient::from_config(&config).unwrap();
    let service = RenameService::new(config, Box::new(provider)).unwrap();

    let scan = service.scan().unwrap();
    let err = service.preview(&scan.run_id, "tidy").await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteCall(_)));
    // No partial mutation of the stored run state.
    assert_eq!(
        service.registry().state(&scan.run_id),
        Some(RunState::Scanned)
    );
}

#[tokio::test]
async fn missing_api_key_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for(&temp, "http://localhost:1".to_string());
    config.openrouter_api_key = None;
    let err = OpenRouterClient::from_config(&config).unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
}
