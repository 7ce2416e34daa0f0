//! 请求鉴权闸口：所有受保护接口在读写数据前必须先通过这里。

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use boutique_protocol::AdminSession;
use tracing::debug;

use crate::{api::error::ApiError, auth::token::SessionTokenService, state::AppState};

/// Bearer 方案前缀（区分大小写，含空格）。
const BEARER_PREFIX: &str = "Bearer ";

/// 从 `Authorization` 头提取 Bearer token；缺失或非 Bearer 方案返回 `None`。
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.strip_prefix(BEARER_PREFIX))
}

/// 校验请求携带的管理 token，失败原因不对外区分。
pub(crate) fn authorize(headers: &HeaderMap, tokens: &SessionTokenService) -> Option<AdminSession> {
    let token = bearer_token(headers)?;
    tokens.verify(token)
}

/// `authorize` 的接口版本：未认证时给出 401 `Non autorisé`。
pub(crate) fn require_admin(
    headers: &HeaderMap,
    tokens: &SessionTokenService,
) -> Result<AdminSession, ApiError> {
    authorize(headers, tokens).ok_or_else(ApiError::unauthorized)
}

/// 后台路由中间件：在任何提取器与处理函数之前完成鉴权，
/// 通过后把 `AdminSession` 放入请求扩展。
pub(crate) async fn admin_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match require_admin(req.headers(), &state.tokens) {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(err) => {
            debug!(path = %req.uri().path(), "admin request rejected");
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};

    use super::{authorize, bearer_token, require_admin};
    use crate::auth::token::SessionTokenService;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_only_exact_bearer_scheme() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
        assert_eq!(bearer_token(&headers_with("Basic YWRtaW46cHc=")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn valid_bearer_token_yields_session() {
        let tokens = SessionTokenService::new("secret").unwrap();
        let headers = headers_with(&format!("Bearer {}", tokens.issue()));
        let session = authorize(&headers, &tokens).expect("session");
        assert!(session.authenticated);
    }

    #[test]
    fn any_failure_maps_to_uniform_401() {
        let tokens = SessionTokenService::new("secret").unwrap();
        let foreign = SessionTokenService::new("other").unwrap().issue();
        for headers in [
            HeaderMap::new(),
            headers_with("Bearer "),
            headers_with("Bearer garbage"),
            headers_with(&format!("Bearer {foreign}")),
            headers_with(&format!("Token {}", tokens.issue())),
        ] {
            let err = require_admin(&headers, &tokens).unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
            assert_eq!(err.message, "Non autorisé");
        }
    }
}
