//! 店面服务共享状态：只读配置、鉴权组件与外部能力句柄。

use std::sync::Arc;

use anyhow::Context;

use crate::{
    auth::{credential::CredentialVerifier, token::SessionTokenService},
    catalog::store::{CatalogStore, JsonCatalogStore},
    config::Config,
    media::upload::{CloudinaryUploader, DisabledUploader, MediaUploader},
};

/// 各请求共享的状态；除存储与上传能力外全部只读。
#[derive(Clone)]
pub(crate) struct AppState {
    /// 启动时构建的不可变配置。
    pub(crate) config: Arc<Config>,
    /// 管理员口令校验器。
    pub(crate) credentials: Arc<CredentialVerifier>,
    /// 会话 token 签发/校验。
    pub(crate) tokens: Arc<SessionTokenService>,
    /// 商品、店铺配置与内容页存储。
    pub(crate) catalog: Arc<dyn CatalogStore>,
    /// 媒体上传服务。
    pub(crate) media: Arc<dyn MediaUploader>,
}

impl AppState {
    /// 按配置装配默认实现：JSON 文件存储 + Cloudinary（未配置则禁用上传）。
    pub(crate) async fn from_config(config: Config) -> anyhow::Result<Self> {
        let catalog = JsonCatalogStore::open(config.data_path.clone())
            .await
            .with_context(|| format!("open catalog store {}", config.data_path.display()))?;
        let media: Arc<dyn MediaUploader> = match config.cloudinary.clone() {
            Some(cloudinary) => Arc::new(CloudinaryUploader::new(cloudinary)),
            None => Arc::new(DisabledUploader),
        };
        Self::with_parts(config, Arc::new(catalog), media)
    }

    /// 以显式给定的存储与上传实现装配状态。
    pub(crate) fn with_parts(
        config: Config,
        catalog: Arc<dyn CatalogStore>,
        media: Arc<dyn MediaUploader>,
    ) -> anyhow::Result<Self> {
        let tokens = SessionTokenService::new(&config.jwt_secret)
            .map_err(|err| anyhow::anyhow!("invalid signing secret: {err}"))?;
        Ok(Self {
            credentials: Arc::new(CredentialVerifier::new(config.admin_password_hash.clone())),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            catalog,
            media,
        })
    }
}
