use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::json;
use services::{
    ApiError, ClientConfig, HttpRequest, HttpTransport, ReqwestTransport, ResponseBody,
    SessionClient,
};
use storage::repository::InMemoryKeyValueStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned HTTP/1.1 response and hand back the raw request head.
async fn serve_once(status_line: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..read]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&head).to_lowercase()
    });

    (base_url, handle)
}

fn transport(base_url: &str) -> ReqwestTransport {
    let config = ClientConfig::new(base_url).unwrap();
    let client = Client::builder().no_proxy().build().unwrap();
    ReqwestTransport::new(client, &config)
}

#[tokio::test]
async fn non_success_status_is_still_a_response() {
    let body = json!({ "message": "Unauthorized" }).to_string();
    let (base_url, server) = serve_once("401 Unauthorized", "application/json", &body).await;

    let response = transport(&base_url)
        .send(HttpRequest {
            method: reqwest::Method::GET,
            path: "/api/auth/me".into(),
            headers: Vec::new(),
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.is_json());
    assert_eq!(response.body, body);
    assert!(server.await.unwrap().starts_with("get /api/auth/me http/1.1"));
}

#[tokio::test]
async fn session_client_maps_live_401_to_status_error() {
    let body = json!({ "message": "Unauthorized" }).to_string();
    let (base_url, server) = serve_once("401 Unauthorized", "application/json", &body).await;
    let session = SessionClient::new(
        Arc::new(transport(&base_url)),
        Arc::new(InMemoryKeyValueStore::new()),
    );
    session.store_session("tok1").await;

    let err = session.get("/api/auth/me").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Unauthorized");
    assert!(matches!(err, ApiError::HttpStatus { .. }));

    let head = server.await.unwrap();
    assert!(head.contains("authorization: bearer tok1\r\n"));
    assert!(head.contains("content-type: application/json\r\n"));
}

#[tokio::test]
async fn session_client_reads_live_json_body() {
    let body = json!({ "status": "success", "data": { "user": { "id": "1" } } }).to_string();
    let (base_url, server) =
        serve_once("200 OK", "application/json; charset=utf-8", &body).await;
    let session = SessionClient::new(
        Arc::new(transport(&base_url)),
        Arc::new(InMemoryKeyValueStore::new()),
    );

    let response = session.get("/api/auth/me").await.unwrap();

    let ResponseBody::Json(value) = response else {
        panic!("expected a JSON body");
    };
    assert_eq!(value["data"]["user"]["id"], "1");
    assert!(!server.await.unwrap().contains("authorization:"));
}
