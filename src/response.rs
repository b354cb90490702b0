//! The `{message, data, meta}` envelope every endpoint answers with. The
//! frontend reads `message` for its toasts and `meta` for pagination, so the
//! three keys are always present even when `meta` carries nothing.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// Meta for single-object responses, where pagination makes no sense.
    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_always_carries_the_three_keys() {
        let body = ApiResponse::success("Ok", 7_i32, Some(Meta::empty()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "Ok");
        assert_eq!(json["data"], 7);
        assert!(json.get("meta").is_some());
    }
}
