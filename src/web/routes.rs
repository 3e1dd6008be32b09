use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::context::AppContext;
use crate::core::error::RegistryError;
use crate::core::models::Identity;
use crate::core::{deletion, export, import};

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = match self {
            RegistryError::NotFound => StatusCode::NOT_FOUND,
            RegistryError::InvalidEncoding => StatusCode::BAD_REQUEST,
            RegistryError::StorageReadFailure(_)
            | RegistryError::PersistenceFailure(_)
            | RegistryError::AssetDeletionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn delete_device(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    if !identity.is_admin {
        return forbidden();
    }

    match deletion::delete_device(ctx.repo.as_ref(), ctx.assets.as_ref(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn upload_csv(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !identity.is_admin {
        return forbidden();
    }

    // The media-type gate runs before the pipeline ever sees the bytes.
    if !is_csv_upload(&headers) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "expected a text/csv upload"})),
        )
            .into_response();
    }

    match import::import_csv(ctx.repo.as_ref(), &body, &identity).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn download_csv(
    State(ctx): State<AppContext>,
    Extension(identity): Extension<Identity>,
) -> Response {
    if !identity.is_admin {
        return forbidden();
    }

    let stream = export::export_csv(ctx.repo.clone());

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=device_export.csv",
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"error": "requires admin role"})),
    )
        .into_response()
}

/// True when the declared media type equals `text/csv` (parameters such as
/// `charset` are ignored).
fn is_csv_upload(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("text/csv")
        })
        .unwrap_or(false)
}
