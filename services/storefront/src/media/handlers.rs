//! 媒体上传 HTTP 接口（挂在 `admin_gate` 之后）。

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::{error, info};

use crate::{
    api::{
        error::ApiError,
        types::{DeleteUploadRequest, SuccessData, UploadData},
    },
    media::upload::{MediaFile, validate_upload},
    state::AppState,
};

/// 上传接口：multipart 字段 `file` 与 `type`（`video` / `image`）。
pub(crate) async fn admin_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadData>, ApiError> {
    let mut kind: Option<String> = None;
    let mut file: Option<MediaFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(err.status(), "Requête multipart invalide"))?
    {
        match field.name() {
            Some("type") => {
                kind = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::new(err.status(), "Requête multipart invalide"))?,
                );
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::new(err.status(), "Requête multipart invalide"))?;
                file = Some(MediaFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let media_kind = validate_upload(kind.as_deref(), file.as_ref())
        .map_err(|rejection| ApiError::bad_request(rejection.to_string()))?;
    let Some(file) = file else {
        return Err(ApiError::bad_request("Aucun fichier fourni"));
    };

    let size = file.bytes.len();
    let uploaded = state.media.upload(media_kind, file).await.map_err(|err| {
        error!("media upload failed: {err}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Erreur upload")
    })?;
    info!(public_id = %uploaded.public_id, size, "media uploaded");

    Ok(Json(UploadData {
        success: true,
        url: uploaded.url,
        thumbnail_url: uploaded.thumbnail_url,
        message: media_kind.success_message().to_string(),
    }))
}

/// 删除接口：仅校验 `publicId`，托管侧资源保留。
pub(crate) async fn admin_delete_upload_handler(
    body: Bytes,
) -> Result<Json<SuccessData>, ApiError> {
    let req: DeleteUploadRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(public_id) = req
        .public_id
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Err(ApiError::bad_request("Public ID requis"));
    };
    info!(public_id = %public_id, "media delete acknowledged");
    Ok(Json(SuccessData {
        success: true,
        message: "Fichier supprimé avec succès".to_string(),
    }))
}
