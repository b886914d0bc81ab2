//! Success envelope shared by every handler. Errors bypass this and are
//! rendered as a flat `{ "error": ... }` body by [`crate::error::AppError`].

use serde::Serialize;
use utoipa::ToSchema;

/// Pagination block carried alongside list payloads. Single-resource
/// responses send it empty so the envelope shape stays stable.
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
    fn envelope_serializes_message_data_and_meta() {
        let body = ApiResponse::success("Orders", vec![1, 2], Some(Meta::new(1, 20, 2)));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "Orders");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["meta"]["per_page"], 20);
    }

    #[test]
    fn empty_meta_keeps_the_fields_as_nulls() {
        let json = serde_json::to_value(Meta::empty()).unwrap();
        assert!(json["page"].is_null());
        assert!(json["total"].is_null());
    }
}
