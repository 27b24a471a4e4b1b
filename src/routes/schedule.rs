use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Local, NaiveDate};
use serde_json::{json, Value};

use crate::{
    error::DiaryError,
    models::schedule::{
        Day, FullSchedule, ScheduleDateQuery, ScheduleEditRequest, MAX_LESSONS,
    },
    routes::{error_reply, ApiError},
    services::schedule::ScheduleService,
    AppState,
};

fn target_date(params: &ScheduleDateQuery) -> NaiveDate {
    params.date.unwrap_or_else(|| Local::now().date_naive())
}

fn load(state: &AppState) -> Result<FullSchedule, ApiError> {
    state
        .store
        .load_schedule()
        .map_err(|e| error_reply(e.into()))
}

/// GET /schedule: the whole versioned document
pub async fn get_schedule(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    load(&state).map(|schedule| Json(json!({ "schedule": schedule })))
}

/// PUT /schedule: overwrite the whole document
pub async fn replace_schedule(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let raw = body.get("schedule").unwrap_or(&Value::Null);
    let schedule = FullSchedule::from_json(raw).ok_or_else(|| {
        error_reply(DiaryError::Validation(
            "Field 'schedule' must be an object keyed by day".into(),
        ))
    })?;

    let _guard = state.write_lock.lock().await;
    state
        .store
        .save_schedule(&schedule)
        .map(|()| Json(json!({ "ok": true })))
        .map_err(|e| error_reply(e.into()))
}

/// GET /schedule/{day}: all versions of one day
pub async fn get_day(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Some(day) = Day::from_label(&day) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": format!("Unknown day. Expected one of: {:?}", Day::labels()) })),
        ));
    };
    let schedule = load(&state)?;
    if !schedule.has_day(day) {
        return Err(error_reply(DiaryError::not_found("schedule for day", day)));
    }
    Ok(Json(json!({ "day": day, "schedule": schedule.versions(day) })))
}

/// GET /schedule/resolved?date=YYYY-MM-DD: lessons of every day as of a date
pub async fn get_resolved(
    State(state): State<AppState>,
    Query(params): Query<ScheduleDateQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = target_date(&params);
    let schedule = load(&state)?;
    let resolved = ScheduleService::resolve_for_date(&schedule, date);
    Ok(Json(json!({ "date": date, "schedule": resolved })))
}

/// GET /schedule/week?date=YYYY-MM-DD: Monday to Saturday of that week
pub async fn get_week(
    State(state): State<AppState>,
    Query(params): Query<ScheduleDateQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = target_date(&params);
    let schedule = load(&state)?;
    let week_start = ScheduleService::week_start(date).map_err(error_reply)?;
    let days = ScheduleService::week_view(&schedule, date).map_err(error_reply)?;
    Ok(Json(json!({ "week_start": week_start, "days": days })))
}

/// GET /schedule/lessons?date=YYYY-MM-DD: lessons on that date
pub async fn get_lessons(
    State(state): State<AppState>,
    Query(params): Query<ScheduleDateQuery>,
) -> Result<Json<Value>, ApiError> {
    let date = target_date(&params);
    let schedule = load(&state)?;
    Ok(Json(json!({
        "date": date,
        "day": Day::from_weekday(date.weekday()),
        "lessons": ScheduleService::lessons_on(&schedule, date),
    })))
}

/// PUT /schedule/edit: set one slot for the week containing `date`
pub async fn edit_slot(
    State(state): State<AppState>,
    Json(body): Json<ScheduleEditRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.slot >= MAX_LESSONS {
        return Err(error_reply(DiaryError::Validation(format!(
            "Slot must be between 0 and {}",
            MAX_LESSONS - 1
        ))));
    }

    let week_start = ScheduleService::week_start(body.date).map_err(error_reply)?;

    let _guard = state.write_lock.lock().await;
    let schedule = ScheduleService::edit(&state.store, body.day, body.date, body.slot, &body.subject)
        .map_err(error_reply)?;
    Ok(Json(json!({
        "ok": true,
        "week_start": week_start,
        "lessons": ScheduleService::resolve_day(&schedule, body.day, body.date),
    })))
}
