use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

use knowmap::config::Config;
use knowmap::server::{router, OWNER_HEADER};
use knowmap::services::Services;
use knowmap_core::embedding::EmbeddingProvider;
use knowmap_core::entities::HeuristicExtractor;
use knowmap_core::store::memory::InMemoryStore;
use knowmap_core::store::Store;

fn test_config(tmp: &TempDir) -> Config {
    toml::from_str(&format!(
        r#"[db]
path = "{}/knowmap.sqlite"

[retrieval]
top_k = 2

[embedding]
provider = "hash"
dims = 128

[server]
bind = "127.0.0.1:0"
"#,
        tmp.path().display()
    ))
    .unwrap()
}

async fn serve(services: Arc<Services>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(services)).await.unwrap();
    });
    addr
}

async fn start_server_with_services() -> (TempDir, SocketAddr, Arc<Services>) {
    let tmp = TempDir::new().unwrap();
    let services = Arc::new(Services::open(&test_config(&tmp)).await.unwrap());
    let addr = serve(services.clone()).await;
    (tmp, addr, services)
}

async fn start_server() -> (TempDir, SocketAddr) {
    let (tmp, addr, _services) = start_server_with_services().await;
    (tmp, addr)
}

async fn post_document(
    client: &reqwest::Client,
    addr: SocketAddr,
    source_name: &str,
    text: &str,
) -> reqwest::Response {
    client
        .post(format!("http://{}/documents", addr))
        .header(OWNER_HEADER, "alice@example.com")
        .json(&serde_json::json!({ "source_name": source_name, "text": text }))
        .send()
        .await
        .unwrap()
}

async fn seed(client: &reqwest::Client, addr: SocketAddr) {
    for (name, text) in [
        ("alpha.txt", "Alice Smith wrote about Rust programming. She covers cargo and crates in detail."),
        ("beta.txt", "Bob Jones discusses Python and machine learning with PyTorch."),
        ("gamma.txt", "Kubernetes and Docker notes from Alice Smith about deployment infrastructure."),
    ] {
        let resp = post_document(client, addr, name, text).await;
        assert_eq!(resp.status(), 200);
    }
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: serde_json::Value = resp.json().await.unwrap();
    body["error"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (_tmp, addr) = start_server().await;
    let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_multipart_upload() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"Alice met Bob in New York City. The meeting was in 2019.".to_vec())
            .file_name("meeting.txt"),
    );
    let resp = client
        .post(format!("http://{}/upload", addr))
        .header(OWNER_HEADER, "alice@example.com")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["msg"], "File uploaded successfully");
    assert_eq!(body["source_name"], "meeting.txt");
    assert_eq!(body["entity_count"], 4);
    assert_eq!(
        body["preview"],
        "alice met bob in new york city the meeting was in 2019 "
    );
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let resp = client
        .post(format!("http://{}/upload", addr))
        .header(OWNER_HEADER, "alice@example.com")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn test_upload_requires_owner_header() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/documents", addr))
        .json(&serde_json::json!({ "source_name": "a.txt", "text": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");

    let docs: serde_json::Value = reqwest::get(format!("http://{}/documents", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(docs, serde_json::json!([]));
}

#[tokio::test]
async fn test_upload_missing_text() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/documents", addr))
        .header(OWNER_HEADER, "alice@example.com")
        .json(&serde_json::json!({ "source_name": "a.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn test_search_ranks_and_limits() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();
    seed(&client, addr).await;

    let results: serde_json::Value = client
        .post(format!("http://{}/search", addr))
        .json(&serde_json::json!({ "query": "machine learning" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let results = results.as_array().unwrap();
    // top_k = 2 in the test config
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["source_name"], "beta.txt");
    assert!(results[0]["score"].as_f64().unwrap() > results[1]["score"].as_f64().unwrap());

    let results: serde_json::Value = client
        .post(format!("http://{}/search", addr))
        .json(&serde_json::json!({ "query": "rust", "limit": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["source_name"], "alpha.txt");
}

#[tokio::test]
async fn test_search_missing_query() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/search", addr))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn test_search_malformed_body() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/search", addr))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "bad_request");
}

#[tokio::test]
async fn test_search_empty_index() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();

    let results: serde_json::Value = client
        .post(format!("http://{}/search", addr))
        .json(&serde_json::json!({ "query": "anything" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results, serde_json::json!([]));
}

#[tokio::test]
async fn test_generate_graph() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();
    seed(&client, addr).await;

    let graph: serde_json::Value = reqwest::get(format!("http://{}/generate_graph", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(graph["nodes"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("Bob Jones")));
    assert!(graph["edges"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!({ "source": "Bob Jones", "target": "Python" })));

    let resp = reqwest::get(format!("http://{}/generate_graph?format=dot", addr))
        .await
        .unwrap();
    assert_eq!(resp.headers()["content-type"], "text/vnd.graphviz");
    let dot = resp.text().await.unwrap();
    assert!(dot.contains("\"Alice Smith\" -> \"Rust\";"));
}

#[tokio::test]
async fn test_generate_graph_empty_index() {
    let (_tmp, addr) = start_server().await;

    let graph: serde_json::Value = reqwest::get(format!("http://{}/generate_graph", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(graph, serde_json::json!({ "nodes": [], "edges": [] }));
}

#[tokio::test]
async fn test_list_documents() {
    let (_tmp, addr) = start_server().await;
    let client = reqwest::Client::new();
    seed(&client, addr).await;

    let docs: serde_json::Value = reqwest::get(format!("http://{}/documents", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let docs = docs.as_array().unwrap();
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[1]["source_name"], "beta.txt");
    assert_eq!(docs[1]["entity_count"], 3);
    assert_eq!(docs[1]["has_embedding"], true);
}

#[tokio::test]
async fn test_large_uploads_accepted_and_capped() {
    let (_tmp, addr, services) = start_server_with_services().await;
    let client = reqwest::Client::new();
    let text = "word ".repeat(600_000);
    assert!(text.len() > 2 * 1024 * 1024);

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(text.clone().into_bytes()).file_name("big.txt"),
    );
    let resp = client
        .post(format!("http://{}/upload", addr))
        .header(OWNER_HEADER, "alice@example.com")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["preview"].as_str().unwrap().chars().count(), 1000);

    let resp = post_document(&client, addr, "big.json.txt", &text).await;
    assert_eq!(resp.status(), 200);

    let records = services.store.scan().await.unwrap();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.normalized_text.chars().count(), 5000);
    }
}

#[tokio::test]
async fn test_body_over_configured_limit_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp);
    config.server.max_upload_bytes = 1024;
    let services = Arc::new(Services::open(&config).await.unwrap());
    let addr = serve(services.clone()).await;

    let client = reqwest::Client::new();
    let resp = post_document(&client, addr, "big.txt", &"word ".repeat(1000)).await;
    assert!(resp.status().is_client_error());
    assert!(services.store.scan().await.unwrap().is_empty());
}

/// Advertises 8 dimensions but returns 4.
struct ShortVectors;

#[async_trait]
impl EmbeddingProvider for ShortVectors {
    fn model_name(&self) -> &str {
        "short"
    }

    fn dims(&self) -> usize {
        8
    }

    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.5; 4]).collect())
    }
}

#[tokio::test]
async fn test_provider_wrong_length_is_internal_error() {
    let tmp = TempDir::new().unwrap();
    let services = Arc::new(Services::new(
        test_config(&tmp),
        Arc::new(InMemoryStore::new(8)),
        Arc::new(HeuristicExtractor::new()),
        Arc::new(ShortVectors),
    ));
    let addr = serve(services.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/search", addr))
        .json(&serde_json::json!({ "query": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(error_code(resp).await, "internal");

    let resp = post_document(&client, addr, "a.txt", "Alice met Bob.").await;
    assert_eq!(resp.status(), 500);
    assert_eq!(error_code(resp).await, "internal");
    assert!(services.store.scan().await.unwrap().is_empty());
}
