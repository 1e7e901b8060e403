//! Reqwest-based transport.

use http::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::error::TransportError;
use crate::form::{FormData, FormValue};
use crate::http::{Transport, TransportBody, TransportRequest, TransportResponse};

/// A [`Transport`] backed by [`reqwest`].
///
/// Connection pooling, TLS, proxies and timeouts are whatever the wrapped
/// `reqwest::Client` was built with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already configured [`reqwest::Client`].
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
        } = request;
        let builder = self.client.request(method, &url);

        let builder = match body {
            Some(TransportBody::Bytes(bytes)) => builder.headers(headers).body(bytes),
            Some(TransportBody::Multipart(form)) => {
                // reqwest adds its own Content-Type carrying the boundary.
                headers.remove(CONTENT_TYPE);
                let form = multipart_form(form).map_err(TransportError::new)?;
                builder.headers(headers).multipart(form)
            }
            None => builder.headers(headers),
        };

        let response = builder.send().await.map_err(TransportError::new)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(TransportError::new)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Lower an ordered `FormData` into a reqwest form, keeping field order.
fn multipart_form(form: FormData) -> Result<Form, reqwest::Error> {
    let mut multipart = Form::new();
    for (name, value) in form.entries() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name.clone(), text.clone()),
            FormValue::Blob(blob) => {
                let part = Part::bytes(blob.data.to_vec())
                    .file_name(blob.file_name_or_default().to_string())
                    .mime_str(blob.mime_type_or_default())?;
                multipart.part(name.clone(), part)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use mock_server::EchoedRequest;

    use super::*;
    use crate::form::Blob;

    async fn start_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn connection_failure_keeps_reqwest_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let request = TransportRequest {
            method: http::Method::GET,
            url: format!("http://{addr}/"),
            headers: http::HeaderMap::new(),
            body: None,
        };
        let err = ReqwestTransport::new().send(request).await.unwrap_err();
        let original = err.get_ref().downcast_ref::<reqwest::Error>().unwrap();
        assert!(original.is_connect());
    }

    #[tokio::test]
    async fn multipart_body_is_encoded_with_reqwest_boundary() {
        let base = start_server().await;
        let mut form = FormData::new();
        form.append("a", "1");
        form.append("file", Blob::new(&b"hello"[..]).with_mime_type("text/plain"));
        let mut headers = http::HeaderMap::new();
        headers.insert(CONTENT_TYPE, http::HeaderValue::from_static("multipart/form-data"));

        let response = ReqwestTransport::new()
            .send(TransportRequest {
                method: http::Method::POST,
                url: format!("{base}/echo"),
                headers,
                body: Some(TransportBody::Multipart(form)),
            })
            .await
            .unwrap();

        let echoed: EchoedRequest = serde_json::from_slice(&response.body).unwrap();
        let content_type = &echoed.headers["content-type"];
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert!(echoed.body.starts_with(&format!("--{boundary}\r\n")));
        let text = echoed.body.find("name=\"a\"").unwrap();
        let file = echoed.body.find("name=\"file\"; filename=\"blob\"").unwrap();
        assert!(text < file);
        assert!(echoed.body.contains("Content-Type: text/plain\r\n"));
    }

    #[test]
    fn unparseable_mime_type_fails_lowering() {
        let mut form = FormData::new();
        form.append("file", Blob::new(&b"x"[..]).with_mime_type("not a mime type"));
        assert!(multipart_form(form).unwrap_err().is_builder());
    }
}
