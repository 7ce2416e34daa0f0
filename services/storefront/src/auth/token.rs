//! 管理会话 token：HS256 JWT（`header.payload.sig`，base64url 无填充）。
//!
//! token 自包含且无服务端存储，只能等待过期；轮换 `JWT_SECRET` 会让全部已签发 token 同时失效。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use boutique_protocol::{AdminSession, unix_to_iso8601};
use hmac::{Hmac, Mac, digest::InvalidLength};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::api::types::SESSION_TTL_SEC;

type HmacSha256 = Hmac<Sha256>;

/// 固定 JOSE 头。
const JWT_ALG: &str = "HS256";
const JWT_TYP: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// 管理 token claims：仅 `admin` 与 `exp`。
#[derive(Debug, Serialize, Deserialize)]
struct AdminClaims {
    admin: bool,
    exp: u64,
}

/// 签发与校验管理会话 token。
#[derive(Clone)]
pub(crate) struct SessionTokenService {
    /// 已装载签名密钥的 HMAC 实例，每次使用时克隆。
    keyed_mac: HmacSha256,
}

impl SessionTokenService {
    pub(crate) fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed_mac: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    /// 签发 24 小时有效的管理 token。
    pub(crate) fn issue(&self) -> String {
        self.issue_at(unix_now())
    }

    /// 以给定时间为签发时刻。
    pub(crate) fn issue_at(&self, now: u64) -> String {
        let claims = AdminClaims {
            admin: true,
            exp: now.saturating_add(SESSION_TTL_SEC),
        };
        self.sign(&claims)
    }

    /// 校验 token；任何失败（格式、签名、过期、非管理员）都返回 `None`。
    pub(crate) fn verify(&self, token: &str) -> Option<AdminSession> {
        self.verify_at(token, unix_now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: u64) -> Option<AdminSession> {
        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(reason) => {
                debug!("admin token rejected: {reason}");
                return None;
            }
        };
        if claims.exp <= now {
            debug!("admin token rejected: expired");
            return None;
        }
        if !claims.admin {
            debug!("admin token rejected: admin claim missing");
            return None;
        }
        Some(AdminSession {
            authenticated: true,
            expires: unix_to_iso8601(claims.exp)?,
        })
    }

    fn sign(&self, claims: &AdminClaims) -> String {
        let header = JwtHeader {
            alg: JWT_ALG.to_string(),
            typ: Some(JWT_TYP.to_string()),
        };
        // 两个结构体都只有基础类型字段，序列化不会失败。
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap_or_default());
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap_or_default());
        let signing_input = format!("{header_b64}.{payload_b64}");
        let mut mac = self.keyed_mac.clone();
        mac.update(signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{signing_input}.{sig_b64}")
    }

    fn decode(&self, token: &str) -> Result<AdminClaims, &'static str> {
        let mut parts = token.trim().split('.');
        let header_b64 = parts.next().unwrap_or_default();
        let payload_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if header_b64.is_empty()
            || payload_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err("malformed token");
        }

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64.as_bytes())
            .map_err(|_| "header encoding")?;
        let header: JwtHeader = serde_json::from_slice(&header_raw).map_err(|_| "header json")?;
        if header.alg != JWT_ALG {
            return Err("unsupported alg");
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| "signature encoding")?;
        let mut mac = self.keyed_mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig).map_err(|_| "signature mismatch")?;

        let payload_raw = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| "payload encoding")?;
        serde_json::from_slice(&payload_raw).map_err(|_| "claims json")
    }
}

/// 当前 unix 秒。
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use boutique_protocol::unix_to_iso8601;

    use super::{AdminClaims, SessionTokenService, unix_now};
    use crate::api::types::SESSION_TTL_SEC;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn fresh_token_verifies_with_24h_expiry() {
        let service = SessionTokenService::new("secret").unwrap();
        let before = unix_now();
        let token = service.issue();
        let session = service.verify(&token).expect("fresh token must verify");

        assert!(session.authenticated);
        let lower = unix_to_iso8601(before + SESSION_TTL_SEC).unwrap();
        let upper = unix_to_iso8601(before + SESSION_TTL_SEC + 1).unwrap();
        assert!(session.expires == lower || session.expires == upper);
    }

    #[test]
    fn token_has_standard_jwt_shape_and_exact_claims() {
        let service = SessionTokenService::new("secret").unwrap();
        let token = service.issue_at(NOW);
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims, serde_json::json!({ "admin": true, "exp": NOW + 86_400 }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = SessionTokenService::new("secret").unwrap();
        let token = service.issue_at(NOW);
        assert!(service.verify_at(&token, NOW + SESSION_TTL_SEC - 1).is_some());
        assert!(service.verify_at(&token, NOW + SESSION_TTL_SEC).is_none());
        assert!(service.verify_at(&token, NOW + SESSION_TTL_SEC + 3600).is_none());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = SessionTokenService::new("old-secret").unwrap();
        let verifier = SessionTokenService::new("new-secret").unwrap();
        let token = issuer.issue_at(NOW);
        assert!(verifier.verify_at(&token, NOW + 1).is_none());
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let service = SessionTokenService::new("secret").unwrap();
        let token = service.issue_at(NOW);
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(br#"{"admin":true,"exp":99999999999}"#);
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert!(service.verify_at(&forged, NOW + 1).is_none());
    }

    #[test]
    fn alg_none_is_rejected() {
        let service = SessionTokenService::new("secret").unwrap();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"admin":true,"exp":99999999999}"#);
        assert!(service.verify_at(&format!("{header}.{claims}."), NOW).is_none());
        assert!(service.verify_at(&format!("{header}.{claims}.AAAA"), NOW).is_none());
    }

    #[test]
    fn validly_signed_non_admin_claims_are_rejected() {
        let service = SessionTokenService::new("secret").unwrap();
        let token = service.sign(&AdminClaims {
            admin: false,
            exp: NOW + 60,
        });
        assert!(service.verify_at(&token, NOW).is_none());
    }

    #[test]
    fn malformed_inputs_never_panic() {
        let service = SessionTokenService::new("secret").unwrap();
        let valid = service.issue_at(NOW);
        let truncated = &valid[..valid.len() - 5];
        for input in [
            "",
            ".",
            "..",
            "...",
            "not-a-token",
            "a.b.c",
            "a.b.c.d",
            "%%%.%%%.%%%",
            "eyJhbGciOiJIUzI1NiJ9.e30.",
            truncated,
        ] {
            assert!(service.verify_at(input, NOW).is_none(), "accepted {input:?}");
        }
    }
}
