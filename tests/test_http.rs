use lib::cart::error::ApiError;
use lib::cart::helpers::{get_lessons, post_order, put_lesson_space, search_lessons};
use lib::cart::models::api_model::{OrderItem, OrderRequest};
use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One-shot backend: answers the first request with `status_line` and `body`,
/// and hands back the raw request it received.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (base_url, handle)
}

// reads headers, then as much body as content-length says
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

fn sample_order() -> OrderRequest {
    OrderRequest {
        name: "John Smith".to_string(),
        phone_number: "1234567890".to_string(),
        items: vec![OrderItem {
            lesson_id: "l1".to_string(),
            quantity: 2,
        }],
    }
}

#[tokio::test]
async fn get_lessons_reads_records() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"[{"_id": "l1", "topic": "Mathematics", "location": "London", "price": 25, "space": 5}, {"_id": "l2", "topic": "Chess"}]"#,
    )
    .await;

    let lessons = get_lessons(&client(), &base_url).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/lessons HTTP/1.1"));
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].topic, "Mathematics");
    assert_eq!(lessons[0].space, 5);
    assert_eq!(lessons[1].location, "");
    assert_eq!(lessons[1].space, 0);
}

#[tokio::test]
async fn get_lessons_turns_server_error_into_rejection() {
    let (base_url, server) = serve_once("500 Internal Server Error", "oops").await;

    let result = get_lessons(&client(), &base_url).await;
    server.await.unwrap();

    match result {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn search_lessons_sends_query_parameter() {
    let (base_url, server) = serve_once("200 OK", r#"[]"#).await;

    let lessons = search_lessons(&client(), &base_url, "art history")
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(lessons.is_empty());
    assert!(request.starts_with("GET /api/search?q=art+history HTTP/1.1"));
}

#[tokio::test]
async fn post_order_sends_order_body() {
    let (base_url, server) = serve_once("201 Created", r#"{"insertedId": "o1"}"#).await;

    let response = post_order(&client(), &base_url, &sample_order())
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /api/orders HTTP/1.1"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "name": "John Smith",
            "phoneNumber": "1234567890",
            "items": [{"lessonID": "l1", "quantity": 2}]
        })
    );
    assert!(response.error.is_none());
    assert_eq!(
        response.fields.get("insertedId"),
        Some(&serde_json::json!("o1"))
    );
}

#[tokio::test]
async fn post_order_with_error_body_on_success_status_is_rejected() {
    let (base_url, server) = serve_once("200 OK", r#"{"error": "sold out"}"#).await;

    let result = post_order(&client(), &base_url, &sample_order()).await;
    server.await.unwrap();

    match result {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 200);
            assert_eq!(message, "sold out");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn post_order_takes_message_from_failed_status() {
    let (base_url, server) = serve_once("400 Bad Request", r#"{"error": "bad"}"#).await;

    let result = post_order(&client(), &base_url, &sample_order()).await;
    server.await.unwrap();

    match result {
        Err(ApiError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn post_order_accepts_empty_success_body() {
    let (base_url, server) = serve_once("201 Created", "").await;

    let response = post_order(&client(), &base_url, &sample_order())
        .await
        .unwrap();
    server.await.unwrap();

    assert!(response.error.is_none());
    assert!(response.fields.is_empty());
}

#[tokio::test]
async fn post_order_accepts_non_json_success_body() {
    let (base_url, server) = serve_once("200 OK", "Order saved").await;

    let result = post_order(&client(), &base_url, &sample_order()).await;
    server.await.unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn put_lesson_space_sends_space_body() {
    let (base_url, server) = serve_once("200 OK", r#"{"acknowledged": true}"#).await;

    put_lesson_space(&client(), &base_url, "l1", 3)
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("PUT /api/lessons/l1 HTTP/1.1"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(body).unwrap(),
        serde_json::json!({"space": 3})
    );
}

#[tokio::test]
async fn put_lesson_space_reports_missing_lesson() {
    let (base_url, server) = serve_once("404 Not Found", r#"{"error": "Lesson not found"}"#).await;

    let result = put_lesson_space(&client(), &base_url, "nope", 1).await;
    server.await.unwrap();

    assert!(matches!(
        result,
        Err(ApiError::Rejected { status: 404, ref message }) if message == "Lesson not found"
    ));
}
