//! 管理员口令校验：只比对 bcrypt 哈希，从不比对明文。

use tracing::{error, warn};

/// bcrypt 工作因子。
pub(crate) const BCRYPT_COST: u32 = 10;

/// 持有管理员口令哈希并校验提交的明文。
#[derive(Clone)]
pub(crate) struct CredentialVerifier {
    hash: String,
}

impl CredentialVerifier {
    pub(crate) fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// 校验明文口令；哈希未配置或比对出错一律返回 `false`。
    pub(crate) fn verify(&self, plaintext: &str) -> bool {
        if self.hash.trim().is_empty() {
            error!("admin password hash is not configured; rejecting login");
            return false;
        }
        match bcrypt::verify(plaintext, &self.hash) {
            Ok(matched) => matched,
            Err(err) => {
                warn!("admin password verification failed: {err}");
                false
            }
        }
    }

    /// 在阻塞线程池中校验，避免 bcrypt 占住异步 worker；任务失败视为校验失败。
    pub(crate) async fn verify_blocking(&self, plaintext: String) -> bool {
        let verifier = self.clone();
        match tokio::task::spawn_blocking(move || verifier.verify(&plaintext)).await {
            Ok(matched) => matched,
            Err(err) => {
                error!("admin password verification task failed: {err}");
                false
            }
        }
    }
}

/// 生成口令哈希（离线工具，供 `hash-password` 命令使用）。
pub(crate) fn hash_password(plaintext: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, BCRYPT_COST)
}

#[cfg(test)]
mod tests {
    use super::{BCRYPT_COST, CredentialVerifier, hash_password};

    #[test]
    fn accepts_only_the_original_secret() {
        let hash = hash_password("correct-secret").unwrap();
        let verifier = CredentialVerifier::new(hash);

        assert!(verifier.verify("correct-secret"));
        assert!(!verifier.verify("correct-secreT"));
        assert!(!verifier.verify("correct-secre"));
        assert!(!verifier.verify("correct-secret "));
        assert!(!verifier.verify(""));
    }

    #[test]
    fn hash_is_salted_and_uses_cost_ten() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with(&format!("$2b${BCRYPT_COST}$")));
    }

    #[test]
    fn empty_hash_fails_closed() {
        for hash in ["", "   "] {
            let verifier = CredentialVerifier::new(hash);
            assert!(!verifier.verify(""));
            assert!(!verifier.verify("anything"));
        }
    }

    #[test]
    fn malformed_hash_is_a_verification_failure() {
        let verifier = CredentialVerifier::new("not-a-bcrypt-hash");
        assert!(!verifier.verify("not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn blocking_variant_matches_sync_result() {
        let verifier = CredentialVerifier::new(hash_password("pw").unwrap());
        assert!(verifier.verify_blocking("pw".to_string()).await);
        assert!(!verifier.verify_blocking("nope".to_string()).await);
    }
}
