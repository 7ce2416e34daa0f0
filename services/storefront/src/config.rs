//! 配置模块职责：
//! 1. 启动时一次性读取环境变量（可由 `.env` 补充），构建不可变运行配置。
//! 2. 签名密钥缺失时拒绝启动，不使用可猜测的默认值。
//! 3. 管理员口令哈希缺失时允许启动，但所有登录都会失败（fail-closed）。

use std::{fmt, path::PathBuf};

use anyhow::bail;

/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:3000";
/// 监听地址环境变量。
pub(crate) const ADDR_ENV: &str = "BOUTIQUE_ADDR";
/// token 签名密钥环境变量；原样使用，不去除首尾空白（全空白视为未设置）。
pub(crate) const JWT_SECRET_ENV: &str = "JWT_SECRET";
/// 管理员口令 bcrypt 哈希环境变量。
pub(crate) const ADMIN_PASSWORD_HASH_ENV: &str = "ADMIN_PASSWORD_HASH";
/// 商品/内容数据文件路径环境变量。
const DATA_PATH_ENV: &str = "BOUTIQUE_DATA_PATH";
/// 媒体托管凭据环境变量：云名称、API key、API secret。
pub(crate) const CLOUDINARY_ENVS: [&str; 3] = [
    "CLOUDINARY_CLOUD_NAME",
    "CLOUDINARY_API_KEY",
    "CLOUDINARY_API_SECRET",
];

/// 媒体托管服务凭据。
#[derive(Clone)]
pub(crate) struct CloudinaryConfig {
    pub(crate) cloud_name: String,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
}

/// 店面服务运行时配置（启动后只读）。
#[derive(Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    /// 会话 token HMAC 签名密钥。
    pub(crate) jwt_secret: String,
    /// 管理员口令 bcrypt 哈希；为空表示未配置。
    pub(crate) admin_password_hash: String,
    /// 商品与内容数据文件。
    pub(crate) data_path: PathBuf,
    /// 媒体上传服务；三项凭据齐全才启用。
    pub(crate) cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    /// 从环境变量构建配置；签名密钥缺失时报错。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定取值函数构建配置，便于测试注入。
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(jwt_secret) = lookup(JWT_SECRET_ENV).filter(|value| !value.trim().is_empty())
        else {
            bail!("{JWT_SECRET_ENV} is not set; refusing to start without a signing secret");
        };

        let [cloud_name_env, api_key_env, api_secret_env] = CLOUDINARY_ENVS;
        let cloudinary = match (read(cloud_name_env), read(api_key_env), read(api_secret_env)) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Ok(Self {
            addr: read(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            jwt_secret,
            admin_password_hash: read(ADMIN_PASSWORD_HASH_ENV).unwrap_or_default(),
            data_path: read(DATA_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_data_path(read("HOME"))),
            cloudinary,
        })
    }

    /// 是否已配置管理员口令哈希。
    pub(crate) fn has_admin_password_hash(&self) -> bool {
        !self.admin_password_hash.is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("jwt_secret", &"<redacted>")
            .field(
                "admin_password_hash",
                &if self.has_admin_password_hash() {
                    "<redacted>"
                } else {
                    "<unset>"
                },
            )
            .field("data_path", &self.data_path)
            .field("cloudinary", &self.cloudinary.as_ref().map(|c| &c.cloud_name))
            .finish()
    }
}

/// 默认数据文件路径：`$HOME/.config/boutique/catalog.json`。
fn default_data_path(home: Option<String>) -> PathBuf {
    PathBuf::from(home.unwrap_or_else(|| ".".to_string()))
        .join(".config")
        .join("boutique")
        .join("catalog.json")
}
