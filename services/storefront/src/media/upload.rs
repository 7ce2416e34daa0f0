//! 媒体上传：文件校验规则与托管服务适配。

use async_trait::async_trait;
use axum::body::Bytes;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{auth::token::unix_now, config::CloudinaryConfig};

/// 视频上限 100MB。
const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;
/// 图片上限 10MB。
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
/// 上传接口请求体上限：最大文件 + multipart 开销。
pub(crate) const UPLOAD_BODY_LIMIT: usize = MAX_VIDEO_BYTES + 1024 * 1024;

const VIDEO_MIME_TYPES: &[&str] = &["video/mp4", "video/mpeg", "video/quicktime", "video/webm"];
const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// 上传文件类别（表单字段 `type`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    fn max_bytes(self) -> usize {
        match self {
            Self::Video => MAX_VIDEO_BYTES,
            Self::Image => MAX_IMAGE_BYTES,
        }
    }

    fn max_label(self) -> &'static str {
        match self {
            Self::Video => "100MB",
            Self::Image => "10MB",
        }
    }

    fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Video => VIDEO_MIME_TYPES,
            Self::Image => IMAGE_MIME_TYPES,
        }
    }

    /// 托管服务的资源类型路径段。
    fn resource_type(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    /// 成功提示文案。
    pub(crate) fn success_message(self) -> &'static str {
        match self {
            Self::Video => "Vidéo uploadée avec succès",
            Self::Image => "Image uploadée avec succès",
        }
    }
}

/// 上传文件校验失败原因，`Display` 即对外文案。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum UploadRejection {
    #[error("Aucun fichier fourni")]
    MissingFile,
    #[error("Type de fichier invalide. Utilisez \"video\" ou \"image\"")]
    InvalidKind,
    #[error("Fichier trop volumineux. Taille max: {}", .0.max_label())]
    TooLarge(MediaKind),
    #[error("Type de fichier non supporté: {0}")]
    UnsupportedMime(String),
}

/// 待上传文件。
#[derive(Debug, Clone)]
pub(crate) struct MediaFile {
    pub(crate) file_name: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Bytes,
}

/// 校验类别、大小与 MIME，通过后返回类别。
pub(crate) fn validate_upload(
    kind: Option<&str>,
    file: Option<&MediaFile>,
) -> Result<MediaKind, UploadRejection> {
    let file = file.ok_or(UploadRejection::MissingFile)?;
    let kind = kind
        .and_then(MediaKind::parse)
        .ok_or(UploadRejection::InvalidKind)?;
    if file.bytes.len() > kind.max_bytes() {
        return Err(UploadRejection::TooLarge(kind));
    }
    if !kind.allowed_mime_types().contains(&file.content_type.as_str()) {
        return Err(UploadRejection::UnsupportedMime(file.content_type.clone()));
    }
    Ok(kind)
}

/// 上传结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UploadedMedia {
    pub(crate) url: String,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) public_id: String,
}

/// 上传失败（细节只进日志）。
#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("media upload provider is not configured")]
    NotConfigured,
    #[error("media upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("media upload rejected by provider: {0}")]
    Provider(String),
}

/// 媒体托管能力。
#[async_trait]
pub(crate) trait MediaUploader: Send + Sync {
    async fn upload(&self, kind: MediaKind, file: MediaFile)
    -> Result<UploadedMedia, UploadError>;
}

/// 未配置托管服务时使用：所有上传都失败。
pub(crate) struct DisabledUploader;

#[async_trait]
impl MediaUploader for DisabledUploader {
    async fn upload(
        &self,
        _kind: MediaKind,
        _file: MediaFile,
    ) -> Result<UploadedMedia, UploadError> {
        Err(UploadError::NotConfigured)
    }
}

/// Cloudinary 签名上传。
pub(crate) struct CloudinaryUploader {
    config: CloudinaryConfig,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    error: Option<CloudinaryErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

impl CloudinaryUploader {
    pub(crate) fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }

    fn upload_url(&self, kind: MediaKind) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url,
            self.config.cloud_name,
            kind.resource_type()
        )
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(
        &self,
        kind: MediaKind,
        file: MediaFile,
    ) -> Result<UploadedMedia, UploadError> {
        let timestamp = unix_now().to_string();
        let folder = format!("boutique/{}s", kind.resource_type());
        let signature = sign_params(
            &[("folder", folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.upload_url(kind))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body: CloudinaryResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(UploadError::Provider(format!("{status}: {}", err.message)));
        }
        let (Some(url), Some(public_id)) = (body.secure_url, body.public_id) else {
            return Err(UploadError::Provider(format!(
                "{status}: missing secure_url/public_id"
            )));
        };

        let thumbnail_url = match kind {
            MediaKind::Video => Some(video_thumbnail_url(&url)),
            MediaKind::Image => None,
        };
        Ok(UploadedMedia {
            url,
            thumbnail_url,
            public_id,
        })
    }
}

/// 参数按名称排序拼成 `k=v&k=v`，追加密钥后取 sha256 hex。
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    sha256_hex(&format!("{joined}{api_secret}"))
}

/// sha256 hex。
fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// 视频缩略图：同一资源地址换成 `.jpg` 扩展名。
fn video_thumbnail_url(video_url: &str) -> String {
    let file_start = video_url.rfind('/').map_or(0, |idx| idx + 1);
    match video_url[file_start..].rfind('.') {
        Some(dot) => format!("{}.jpg", &video_url[..file_start + dot]),
        None => format!("{video_url}.jpg"),
    }
}
