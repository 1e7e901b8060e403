//! Test server for the web client.
//!
//! - any method on any unmatched path echoes the request back as JSON
//! - `POST`/`PUT /upload` reads a multipart body and reports its fields in
//!   wire order
//! - `/status/{code}` answers with that status and a JSON error body
//! - `GET /whoami` requires an `Authorization` header

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// What the echo fallback saw.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub upload_id: Uuid,
    pub fields: Vec<ReceivedField>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub msg: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/upload", post(upload).put(upload))
        .route("/status/{code}", any(status))
        .route("/whoami", get(whoami))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<UploadReceipt>, (StatusCode, Json<ErrorBody>)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let size = field.bytes().await.map_err(bad_request)?.len();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            size,
        });
    }
    let receipt = UploadReceipt {
        upload_id: Uuid::new_v4(),
        fields,
    };
    tracing::info!(upload_id = %receipt.upload_id, fields = receipt.fields.len(), "upload received");
    Ok(Json(receipt))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<ErrorBody>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    let msg = status.canonical_reason().unwrap_or("unknown").to_string();
    (status, Json(ErrorBody { msg }))
}

async fn whoami(headers: HeaderMap) -> Result<Json<BTreeMap<String, String>>, (StatusCode, Json<ErrorBody>)> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    msg: "missing credentials".to_string(),
                }),
            )
        })?;
    Ok(Json(BTreeMap::from([(
        "authorization".to_string(),
        authorization.to_string(),
    )])))
}

fn bad_request(err: axum::extract::multipart::MultipartError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            msg: err.body_text(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_receipt_uses_camel_case() {
        let receipt = UploadReceipt {
            upload_id: Uuid::nil(),
            fields: vec![ReceivedField {
                name: "file".to_string(),
                file_name: Some("blob".to_string()),
                content_type: None,
                size: 3,
            }],
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["uploadId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["fields"][0]["fileName"], "blob");
        assert_eq!(json["fields"][0]["size"], 3);
    }

    #[test]
    fn echoed_request_roundtrips_through_json() {
        let echoed = EchoedRequest {
            method: "POST".to_string(),
            path: "/items:archive".to_string(),
            headers: BTreeMap::from([("accept".to_string(), "*/*".to_string())]),
            body: String::new(),
        };
        let json = serde_json::to_string(&echoed).unwrap();
        let back: EchoedRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echoed);
    }
}
