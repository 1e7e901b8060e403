use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, EchoedRequest, ErrorBody, UploadReceipt};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn multipart_request(method: &str, boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<String> {
    let mut body = String::new();
    for (name, file_name, value) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )),
            None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method(method)
        .uri("/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_method_path_headers_and_body() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/items/1?x=y")
                .header("x-trace", "abc")
                .body(r#"{"a":1}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "PATCH");
    assert_eq!(echoed.path, "/items/1");
    assert_eq!(echoed.headers.get("x-trace").map(String::as_str), Some("abc"));
    assert_eq!(echoed.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn echo_accepts_colon_suffixed_paths() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/items/1:archive")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: EchoedRequest = body_json(resp).await;
    assert_eq!(echoed.path, "/items/1:archive");
}

// --- upload ---

#[tokio::test]
async fn upload_reports_fields_in_wire_order() {
    let resp = app()
        .oneshot(multipart_request(
            "POST",
            "XyZ",
            &[("key", None, "uploads/a"), ("file", Some("a.bin"), "hello")],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: UploadReceipt = body_json(resp).await;
    let names: Vec<_> = receipt.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["key", "file"]);
    assert_eq!(receipt.fields[1].file_name.as_deref(), Some("a.bin"));
    assert_eq!(receipt.fields[1].size, 5);
    assert!(receipt.fields[0].file_name.is_none());
}

#[tokio::test]
async fn upload_accepts_put() {
    let resp = app()
        .oneshot(multipart_request("PUT", "b", &[("file", Some("blob"), "x")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_multipart_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body("{}".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

// --- status ---

#[tokio::test]
async fn status_answers_with_requested_code() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/status/404")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.msg, "Not Found");
}

#[tokio::test]
async fn status_works_for_any_method() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/status/503")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_with_bad_code_returns_400() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/status/not-a-number")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- whoami ---

#[tokio::test]
async fn whoami_requires_credentials() {
    let resp = app()
        .oneshot(Request::builder().uri("/whoami").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.msg, "missing credentials");
}

#[tokio::test]
async fn whoami_reports_authorization_header() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header(http::header::AUTHORIZATION, "Bearer abc")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["authorization"], "Bearer abc");
}
