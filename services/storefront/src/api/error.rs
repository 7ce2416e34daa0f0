//! API 错误定义与响应转换。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// 未认证时对外统一返回的错误文案。
pub(crate) const UNAUTHORIZED_MESSAGE: &str = "Non autorisé";
/// 请求体无法解析时对外统一返回的错误文案。
pub(crate) const INVALID_BODY_MESSAGE: &str = "Données invalides";
/// 内部故障时对外统一返回的错误文案。
pub(crate) const INTERNAL_MESSAGE: &str = "Erreur serveur";

/// 接口错误：状态码 + 面向用户的文案（`{"error": ...}`）。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 内部故障：细节只进日志，客户端只看到通用文案。
    pub(crate) fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

/// JSON 请求体被拒（缺少 content-type、语法错误、字段类型不符）统一转成 400。
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("json body rejected: {}", rejection.body_text());
        Self::bad_request(INVALID_BODY_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
