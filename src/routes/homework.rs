use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::{
    models::homework::{HomeworkDayPayload, HomeworkEntryPayload},
    routes::{error_reply, ApiError},
    services::homework::HomeworkService,
    AppState,
};

/// GET /homework
pub async fn list_homework(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    HomeworkService::list_all(&state.store)
        .map(|homework| Json(json!({ "homework": homework })))
        .map_err(error_reply)
}

/// GET /homework/{date} (YYYY-MM-DD)
pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Value>, ApiError> {
    HomeworkService::get(&state.store, date)
        .map(|homework| Json(json!({ "date": date, "homework": homework })))
        .map_err(error_reply)
}

/// PUT /homework/{date}: replace the day's homework
pub async fn put_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<HomeworkDayPayload>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    HomeworkService::put(&state.store, date, body.homework)
        .map(|homework| Json(json!({ "ok": true, "date": date, "homework": homework })))
        .map_err(error_reply)
}

/// DELETE /homework/{date}
pub async fn delete_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    HomeworkService::delete(&state.store, date)
        .map(|()| Json(json!({ "ok": true })))
        .map_err(error_reply)
}

/// PUT /homework/{date}/{subject}: set one subject's homework
pub async fn set_entry(
    State(state): State<AppState>,
    Path((date, subject)): Path<(NaiveDate, String)>,
    Json(body): Json<HomeworkEntryPayload>,
) -> Result<Json<Value>, ApiError> {
    let _guard = state.write_lock.lock().await;
    HomeworkService::set_entry(&state.store, date, &subject, &body.text)
        .map(|homework| Json(json!({ "ok": true, "date": date, "homework": homework })))
        .map_err(error_reply)
}
