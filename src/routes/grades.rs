use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::grades::{GradesPayload, SetMarkRequest, TermQuery},
    routes::{error_reply, ApiError},
    services::grades::GradeService,
    AppState,
};

/// GET /grades
pub async fn list_grades(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    GradeService::list_all(&state.store)
        .map(|grades| Json(json!({ "grades": grades })))
        .map_err(error_reply)
}

/// GET /grades/{subject}
pub async fn get_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<Value>, ApiError> {
    GradeService::get(&state.store, &subject)
        .map(|grades| Json(json!({ "subject": subject, "grades": grades })))
        .map_err(error_reply)
}

/// PUT /grades/{subject}: replace all four terms
pub async fn put_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(body): Json<GradesPayload>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    GradeService::put(&state.store, &subject, body.grades)
        .map(|grades| Json(json!({ "ok": true, "subject": subject, "grades": grades })))
        .map_err(error_reply)
}

/// DELETE /grades/{subject}
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    GradeService::delete(&state.store, &subject)
        .map(|()| Json(json!({ "ok": true })))
        .map_err(error_reply)
}

/// PUT /grades/{subject}/mark: set one mark
pub async fn set_mark(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Json(body): Json<SetMarkRequest>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    GradeService::set_mark(&state.store, &subject, body.term, body.index, &body.mark)
        .map(|grades| Json(json!({ "ok": true, "subject": subject, "grades": grades })))
        .map_err(error_reply)
}

/// GET /grades/{subject}/average?term=N
pub async fn get_average(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(params): Query<TermQuery>,
) -> Result<Json<Value>, ApiError> {
    GradeService::average(&state.store, &subject, params.term)
        .map(|average| {
            Json(json!({ "subject": subject, "term": params.term, "average": average }))
        })
        .map_err(error_reply)
}

/// GET /grades/columns?term=N: mark columns the grades table shows
pub async fn visible_columns(
    State(state): State<AppState>,
    Query(params): Query<TermQuery>,
) -> Result<Json<Value>, ApiError> {
    GradeService::visible_columns(&state.store, params.term)
        .map(|columns| Json(json!({ "term": params.term, "columns": columns })))
        .map_err(error_reply)
}
