// src/api/schemas.rs
use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

/// Standard success response wrapper
#[derive(Serialize, ToSchema)]
#[serde(bound = "T: Serialize")]
pub struct SuccessResponse<T> {
    /// Always true for successful responses
    #[schema(example = true)]
    pub success: bool,
    /// Response data
    pub data: T,
}

/// Standard error response wrapper
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false for error responses
    #[schema(example = false)]
    pub success: bool,
    /// Error details
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    #[schema(example = "REVIEW_ALREADY_EXISTS")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "You have already reviewed this title")]
    pub message: String,

    /// Present on `VALIDATION_ERROR` only
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = json!({ "score": ["Score must be between 1 and 10"] }))]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}
