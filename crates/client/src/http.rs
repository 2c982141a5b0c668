use std::time::Instant;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Shared HTTP plumbing. Every handle derived from one client holds the same
/// `Transport`, so the headers captured at construction ride on every call.
#[derive(Debug)]
pub(crate) struct Transport {
    http: Client,
    root: String,
}

impl Transport {
    pub(crate) fn new(cfg: &ClientConfig) -> ClientResult<Self> {
        cfg.validate()?;
        let http = Client::builder()
            .default_headers(cfg.header_map()?)
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            http,
            root: cfg.api_root(),
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::GET, path, None::<&()>).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::DELETE, path, None::<&()>).await
    }

    async fn execute<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let url = format!("{}{}", self.root, path);
        debug!(method = %method, path, "vecstore_request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let value = match parse_body(status, &text) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "vecstore_remote_error"
                );
                return Err(err);
            }
        };

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "vecstore_response"
        );
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Turns a raw response into JSON, surfacing the service's own error text.
fn parse_body(status: StatusCode, text: &str) -> ClientResult<Value> {
    let parsed: Option<Value> = if text.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str(text).ok()
    };

    if !status.is_success() {
        return Err(ClientError::Remote {
            status: status.as_u16(),
            message: parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| text.to_string()),
        });
    }

    match parsed {
        Some(value) if carries_error(&value) => Err(ClientError::Remote {
            status: status.as_u16(),
            message: error_message(&value).unwrap_or_else(|| text.to_string()),
        }),
        Some(value) => Ok(value),
        None => Err(ClientError::Decode(format!("response is not JSON: {text}"))),
    }
}

/// A success body only signals failure through a non-empty `error` field;
/// `"error": null` or `""` is a clean response.
fn carries_error(value: &Value) -> bool {
    match value.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(obj)) => !obj.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn error_message(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    ["error", "message"]
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_is_preferred() {
        let err = parse_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "ValueError('bad where')", "message": "ignored"}"#,
        )
        .unwrap_err();
        match err {
            ClientError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "ValueError('bad where')");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn message_field_used_when_no_error() {
        let err = parse_body(StatusCode::NOT_FOUND, r#"{"message": "no such collection"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "no such collection");
    }

    #[test]
    fn null_error_falls_through_to_message() {
        let err = parse_body(
            StatusCode::CONFLICT,
            r#"{"error": null, "message": "collection exists"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "collection exists");
    }

    #[test]
    fn raw_body_used_when_not_json() {
        let err = parse_body(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert_eq!(err.to_string(), "upstream down");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn success_with_error_key_is_an_error() {
        let err = parse_body(StatusCode::OK, r#"{"error": "InvalidDimension"}"#).unwrap_err();
        assert_eq!(err.to_string(), "InvalidDimension");
    }

    #[test]
    fn success_with_null_or_empty_error_is_fine() {
        let value = parse_body(StatusCode::OK, r#"{"ids": ["a"], "error": null}"#).unwrap();
        assert_eq!(value, json!({ "ids": ["a"], "error": null }));

        let value = parse_body(StatusCode::OK, r#"{"ids": [], "error": ""}"#).unwrap();
        assert_eq!(value["ids"], json!([]));
    }

    #[test]
    fn success_with_structured_error_is_an_error() {
        let err = parse_body(StatusCode::OK, r#"{"error": {"code": 7}}"#).unwrap_err();
        assert_eq!(err.to_string(), r#"{"code":7}"#);
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn success_with_message_only_is_fine() {
        let value = parse_body(StatusCode::OK, r#"{"message": "ok"}"#).unwrap();
        assert_eq!(value, json!({ "message": "ok" }));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body(StatusCode::OK, "").unwrap(), Value::Null);
    }

    #[test]
    fn non_json_success_is_decode_error() {
        assert!(matches!(
            parse_body(StatusCode::OK, "<html>"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn transport_rejects_bad_base_url() {
        let err = Transport::new(&ClientConfig::new("db:8000")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }
}
