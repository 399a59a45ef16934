use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Uniform response envelope. `code` mirrors the HTTP status; the
/// version-check endpoint decouples them for its safe-default error payloads.
#[derive(Debug, Serialize)]
pub struct ApiBody<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    with_status(StatusCode::OK, "success", Some(data))
}

pub fn ok_message<T: Serialize>(message: &str, data: T) -> HttpResponse {
    with_status(StatusCode::OK, message, Some(data))
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    with_status(StatusCode::CREATED, message, Some(data))
}

pub fn with_status<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiBody {
        code: status.as_u16(),
        message: message.to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_code_mirrors_status() {
        let resp = ok(serde_json::json!({"x": 1}));
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = created("created", serde_json::json!({}));
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[test]
    fn envelope_serializes_null_data() {
        let body = ApiBody::<()> {
            code: 404,
            message: "not found".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], 404);
        assert!(json["data"].is_null());
    }
}
