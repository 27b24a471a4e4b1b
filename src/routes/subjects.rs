use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::subjects::{SubjectNameRequest, SubjectsPayload},
    routes::{error_reply, ApiError},
    services::subjects::SubjectService,
    AppState,
};

/// GET /subjects
pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    SubjectService::list(&state.store)
        .map(|subjects| Json(json!({ "subjects": subjects })))
        .map_err(error_reply)
}

/// PUT /subjects: replace the whole list
pub async fn replace_subjects(
    State(state): State<AppState>,
    Json(body): Json<SubjectsPayload>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::replace_all(&state.store, body.subjects)
        .map(|subjects| Json(json!({ "ok": true, "subjects": subjects })))
        .map_err(error_reply)
}

/// POST /subjects: add one subject
pub async fn add_subject(
    State(state): State<AppState>,
    Json(body): Json<SubjectNameRequest>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::add(&state.store, &body.name)
        .map(|subjects| Json(json!({ "ok": true, "subjects": subjects })))
        .map_err(error_reply)
}

/// PUT /subjects/{name}: rename
pub async fn rename_subject(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SubjectNameRequest>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::rename(&state.store, &name, &body.name)
        .map(|subjects| Json(json!({ "ok": true, "subjects": subjects })))
        .map_err(error_reply)
}

/// DELETE /subjects/{name}
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::remove(&state.store, &name)
        .map(|subjects| Json(json!({ "ok": true, "subjects": subjects })))
        .map_err(error_reply)
}

/// GET /visible-subjects: subjects not hidden from the grades view
pub async fn list_visible(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    SubjectService::visible(&state.store)
        .map(|subjects| Json(json!({ "subjects": subjects })))
        .map_err(error_reply)
}

/// GET /hidden-subjects
pub async fn list_hidden(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    SubjectService::hidden(&state.store)
        .map(|hidden| Json(json!({ "subjects": hidden })))
        .map_err(error_reply)
}

/// PUT /hidden-subjects: replace the hidden set
pub async fn replace_hidden(
    State(state): State<AppState>,
    Json(body): Json<SubjectsPayload>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::set_hidden(&state.store, body.subjects)
        .map(|hidden| Json(json!({ "ok": true, "subjects": hidden })))
        .map_err(error_reply)
}

/// POST /hidden-subjects/{name}: hide one subject
pub async fn hide_subject(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::hide(&state.store, &name)
        .map(|hidden| Json(json!({ "ok": true, "subjects": hidden })))
        .map_err(error_reply)
}

/// DELETE /hidden-subjects/{name}: show it again
pub async fn unhide_subject(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    SubjectService::unhide(&state.store, &name)
        .map(|hidden| Json(json!({ "ok": true, "subjects": hidden })))
        .map_err(error_reply)
}
