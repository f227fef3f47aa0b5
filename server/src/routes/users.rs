use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{decode_all, normalize_email};
use crate::{
    auth::CurrentUser,
    db,
    error::AppError,
    models::{Envelope, User, UserChanges},
    uploads::{self, StoredFile},
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<User>>, AppError> {
    current.require_admin()?;
    let rows = state.db.read().await.all("users")?;
    Ok(Json(decode_all(rows)?))
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    current.require_owner_or_admin(id)?;
    let row = state.db.read().await.find("users", id)?;
    Ok(Json(db::from_row(row)?))
}

/// Accepts either `{"user": {...}}` as JSON or top-level multipart fields,
/// which is how avatar uploads arrive.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<User>, AppError> {
    current.require_owner_or_admin(id)?;

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    let (mut changes, upload) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(id, multipart).await?
    } else {
        let Json(Envelope { data }) = Json::<Envelope<UserChanges>>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        (data, None)
    };

    if changes.role.is_some() && !current.0.is_admin() {
        return Err(AppError::Forbidden);
    }
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("`name` can't be blank".to_string()));
    }
    if let Some(email) = changes.email.as_deref() {
        let email = normalize_email(email);
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".to_string()));
        }
        changes.email = Some(email);
    }

    let mut db = state.db.write().await;
    if let Some(email) = &changes.email {
        let taken = db
            .where_eq("users", "email", &json!(email))?
            .iter()
            .any(|row| row.get("id") != Some(&json!(id)));
        if taken {
            return Err(AppError::Validation("email has already been taken".to_string()));
        }
    }
    let row = db.update("users", id, db::to_row(&changes)?)?;
    if let Some(file) = upload {
        state.avatars.put(id, file).await;
    }
    Ok(Json(db::from_row(row)?))
}

/// Reads top-level form fields. An `avatar` file part is returned
/// separately and only stored once the update succeeds.
async fn read_multipart(
    user_id: i64,
    mut multipart: Multipart,
) -> Result<(UserChanges, Option<StoredFile>), AppError> {
    let bad_request = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());
    let mut changes = UserChanges::default();
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "avatar" => {
                let file_name = uploads::sanitize_file_name(field.file_name().unwrap_or_default());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_request)?;
                log::info!("received avatar {file_name:?} ({} bytes) for user {user_id}", data.len());
                changes.avatar = Some(uploads::avatar_url(user_id, &file_name));
                upload = Some(StoredFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "name" => changes.name = Some(field.text().await.map_err(bad_request)?),
            "email" => changes.email = Some(field.text().await.map_err(bad_request)?),
            "phone" => changes.phone = Some(field.text().await.map_err(bad_request)?),
            "role" => changes.role = Some(field.text().await.map_err(bad_request)?),
            other => log::debug!("ignoring multipart field {other:?}"),
        }
    }
    Ok((changes, upload))
}

/// Serves an uploaded avatar. Public, like any static asset.
pub async fn avatar(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(i64, String)>,
) -> Result<Response, AppError> {
    let file = state
        .avatars
        .get(id, &file_name)
        .await
        .ok_or_else(|| AppError::NotFound(format!("avatar {file_name} not found")))?;
    Ok(([(CONTENT_TYPE, file.content_type)], file.data).into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    current.require_admin()?;
    state.db.write().await.delete("users", id)?;
    state.avatars.remove(id).await;
    Ok(StatusCode::NO_CONTENT)
}
