#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use repo_insight::config::{GitHubConfig, ProcessingConfig};
use repo_insight::GitHubFetcher;
use serde_json::{json, Value};

pub mod test_helpers {
    use super::*;

    pub async fn setup_test_server() -> ServerGuard {
        mockito::Server::new_async().await
    }

    /// GitHub settings pointing both the API and the raw host at `server`
    pub fn github_config(server: &ServerGuard) -> GitHubConfig {
        GitHubConfig {
            api_base: server.url(),
            raw_base: server.url(),
            token: None,
            timeout_secs: 5,
        }
    }

    pub fn create_test_fetcher(server: &ServerGuard) -> GitHubFetcher {
        GitHubFetcher::new(
            &github_config(server),
            &ProcessingConfig {
                max_concurrent_downloads: 2,
            },
        )
        .expect("Failed to build fetcher")
    }

    pub fn widget_record() -> Value {
        json!({
            "name": "Widget",
            "description": "A widget",
            "html_url": "https://github.com/acme/widget",
            "default_branch": "main",
            "license": {"name": "MIT License"},
            "owner": {"login": "acme"}
        })
    }

    pub fn file_item(server: &ServerGuard, path: &str, size: u64) -> Value {
        json!({
            "path": path,
            "type": "file",
            "size": size,
            "download_url": format!("{}/raw/{}", server.url(), path)
        })
    }

    pub fn dir_item(path: &str) -> Value {
        json!({"path": path, "type": "dir", "size": 0, "download_url": null})
    }

    pub async fn mock_json(server: &mut ServerGuard, path: &str, body: Value) -> Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_text(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    /// Mocks a single-file repository `acme/widget` with a README
    pub async fn mock_widget_repository(server: &mut ServerGuard) -> Vec<Mock> {
        let root = json!([file_item(server, "src/lib.rs", 13)]);
        vec![
            mock_json(server, "/repos/acme/widget", widget_record()).await,
            mock_text(server, "/acme/widget/main/README.md", "# Widget").await,
            mock_json(server, "/repos/acme/widget/contents/", root).await,
            mock_text(server, "/raw/src/lib.rs", "pub fn f() {}").await,
        ]
    }

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }
}
