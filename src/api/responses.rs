//! Response envelope helpers
//!
//! Every successful response is a `{"message": ..., "data": ...}` envelope;
//! error responses carry only the message and are produced by `ApiError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    pub data: T,
}

/// 200 OK with a message and payload
pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}

/// 201 Created with a message and payload
pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(Envelope {
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}

/// 200 OK with a message and null data
pub fn ok_empty(message: &str) -> Response {
    ok(message, json!(null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let envelope = Envelope {
            message: "Done".to_string(),
            data: json!({"id": 1}),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["message"], "Done");
        assert_eq!(value["data"]["id"], 1);
    }

    #[test]
    fn test_created_status() {
        let response = created("Made", json!({}));
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
