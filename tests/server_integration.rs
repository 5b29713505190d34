//! End-to-end tests for the browser viewer.
//!
//! Each test starts the real router on a free port and talks to it over
//! HTTP, the way a browser form submission would.

use std::fs;

use store_tidy::config::Config;
use store_tidy::server::run_server;
use tempfile::TempDir;

fn test_config_with_port(port: u16, max_file_bytes: u64) -> Config {
    let config_content = format!(
        r#"
[viewer]
max_file_bytes = {}

[server]
bind = "127.0.0.1:{}"
"#,
        max_file_bytes, port
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start(max_file_bytes: u64) -> u16 {
    let port = find_free_port();
    let cfg = test_config_with_port(port, max_file_bytes);
    tokio::spawn(async move {
        run_server(&cfg).await.unwrap();
    });
    wait_for_server(port).await;
    port
}

#[tokio::test]
async fn test_health_and_index() {
    let port = start(1024).await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let index = client
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(index.contains("action=\"/upload\""));
    assert!(index.contains("action=\"/folder\""));
}

#[tokio::test]
async fn test_folder_form_renders_batch() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "alpha text").unwrap();
    fs::write(tmp.path().join("b.bin"), vec![0u8; 4096]).unwrap();

    let port = start(1024).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/folder", port))
        .form(&[("path", tmp.path().to_str().unwrap())])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let page = resp.text().await.unwrap();
    assert!(page.contains("=== a.txt ===\nalpha text"));
    assert!(page.contains("[File too large to display - skipped]"));
    assert!(page.contains("download=\"file_contents.txt\""));
}

#[tokio::test]
async fn test_folder_form_rejects_missing_path() {
    let tmp = TempDir::new().unwrap();
    let port = start(1024).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://127.0.0.1:{}/folder", port))
        .form(&[("path", tmp.path().join("absent").to_str().unwrap())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = client
        .post(format!("http://127.0.0.1:{}/folder", port))
        .form(&[("path", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn test_upload_decodes_text_and_flags_binary() {
    let port = start(1024).await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .part(
            "files",
            reqwest::multipart::Part::bytes(b"hello upload".to_vec()).file_name("notes.txt"),
        )
        .part(
            "files",
            reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]).file_name("photo.jpg"),
        );

    let resp = client
        .post(format!("http://127.0.0.1:{}/upload", port))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let page = resp.text().await.unwrap();
    assert!(page.contains("=== notes.txt ===\nhello upload"));
    assert!(page.contains("=== photo.jpg ===\n[Binary file - content not displayed]"));
    assert!(page.contains("<details><summary>notes.txt (12 bytes)</summary>"));
}

#[tokio::test]
async fn test_cross_origin_folder_read_is_not_shared() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("id_rsa"), "PRIVATE KEY").unwrap();

    let port = start(1024).await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/folder", port))
        .header("Origin", "https://elsewhere.example")
        .form(&[("path", tmp.path().to_str().unwrap())])
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .get("access-control-allow-origin")
        .is_none());

    let preflight = client
        .request(
            reqwest::Method::OPTIONS,
            format!("http://127.0.0.1:{}/folder", port),
        )
        .header("Origin", "https://elsewhere.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert!(preflight
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
