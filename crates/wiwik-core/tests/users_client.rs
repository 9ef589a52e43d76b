#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! `UsersClient` against a minimal local HTTP server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use wiwik_core::config::ServerConfig;
use wiwik_core::search::{SearchError, SearchQuery, UserSearch, UsersClient};

/// Serve one request with `status` and `body`; resolves to the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let request = String::from_utf8_lossy(&request).to_string();
        // Pick up a form body if one follows the headers.
        let request = if request.starts_with("POST") && request.ends_with("\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            format!("{request}{}", String::from_utf8_lossy(&buf[..n]))
        } else {
            request
        };
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });
    (format!("http://{addr}"), handle)
}

fn client(base_url: String) -> UsersClient {
    UsersClient::new(&ServerConfig {
        base_url,
        ..ServerConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn search_decodes_results() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"results": [{"username": "user1", "name": "First", "profile_pic": "/p.png", "value": "user1"}]}"#,
    )
    .await;
    let query = SearchQuery::new("us").with_selected(vec!["user2".into()]);
    let results = client(url).search(&query).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].display_name(), "First");
    assert_eq!(results[0].avatar_url(), "/media/p.png");

    let request = server.await.unwrap();
    assert!(
        request.starts_with("GET /users-autocomplete/?q=us&selected=user2 HTTP/1.1"),
        "unexpected request: {request}"
    );
}

#[tokio::test]
async fn missing_results_key_is_empty() {
    let (url, server) = serve_once("200 OK", "{}").await;
    let results = client(url).search(&SearchQuery::new("x")).await.unwrap();
    assert!(results.is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let (url, server) = serve_once("200 OK", "<html>oops</html>").await;
    let err = client(url).search(&SearchQuery::new("x")).await.unwrap_err();
    assert!(err.is_malformed());
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_is_api_error() {
    let (url, server) = serve_once("500 Internal Server Error", "{}").await;
    let err = client(url).search(&SearchQuery::new("x")).await.unwrap_err();
    assert!(matches!(err, SearchError::Api { status: 500, .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn invite_posts_comma_joined_usernames() {
    let (url, server) = serve_once("200 OK", "{}").await;
    client(url)
        .invite_users(7, &["amy".to_string(), "bob".to_string()])
        .await
        .unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /question/7/invite/ HTTP/1.1"));
    assert!(request.contains("usernames=amy%2Cbob"));
}
