//! 鉴权 HTTP 接口：`POST /api/admin/auth` 登录，`GET /api/admin/auth` 检查会话。

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        types::{LoginData, LoginRequest, PasswordInput, SessionStatus},
    },
    auth::gate::bearer_token,
    state::AppState,
};

/// 登录接口：口令正确则签发 24 小时管理 token。
pub(crate) async fn admin_login_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // 请求体无法解析时同样视为缺少口令。
    let req: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();
    let verified = match req.into_password() {
        PasswordInput::Missing => {
            return ApiError::bad_request("Mot de passe requis").into_response();
        }
        PasswordInput::Unusable => false,
        PasswordInput::Text(password) => state.credentials.verify_blocking(password).await,
    };

    if !verified {
        warn!("admin login rejected");
        return ApiError::new(StatusCode::UNAUTHORIZED, "Mot de passe incorrect").into_response();
    }

    info!("admin login succeeded");
    Json(LoginData {
        success: true,
        token: state.tokens.issue(),
        message: "Connexion réussie",
    })
    .into_response()
}

/// 会话检查接口：返回 token 是否有效及过期时间。
pub(crate) async fn admin_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<SessionStatus>) {
    let Some(token) = bearer_token(&headers) else {
        return session_rejected("Token manquant");
    };
    match state.tokens.verify(token) {
        Some(session) => (
            StatusCode::OK,
            Json(SessionStatus {
                authenticated: true,
                expires: Some(session.expires),
                error: None,
            }),
        ),
        None => session_rejected("Token invalide"),
    }
}

fn session_rejected(reason: &'static str) -> (StatusCode, Json<SessionStatus>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(SessionStatus {
            authenticated: false,
            expires: None,
            error: Some(reason),
        }),
    )
}
