pub mod grades;
pub mod health;
pub mod homework;
pub mod schedule;
pub mod subjects;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{error::DiaryError, AppState};

/// Error half of every handler result: a status and `{"error": ...}`.
pub type ApiError = (StatusCode, Json<Value>);

pub fn error_reply(err: DiaryError) -> ApiError {
    let status = match &err {
        DiaryError::NotFound { .. } => StatusCode::NOT_FOUND,
        DiaryError::Conflict(_) => StatusCode::CONFLICT,
        DiaryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DiaryError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// All API routes. Middleware layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Subjects
        .route(
            "/subjects",
            get(subjects::list_subjects)
                .put(subjects::replace_subjects)
                .post(subjects::add_subject),
        )
        .route(
            "/subjects/{name}",
            put(subjects::rename_subject).delete(subjects::delete_subject),
        )
        .route("/visible-subjects", get(subjects::list_visible))
        .route(
            "/hidden-subjects",
            get(subjects::list_hidden).put(subjects::replace_hidden),
        )
        .route(
            "/hidden-subjects/{name}",
            post(subjects::hide_subject).delete(subjects::unhide_subject),
        )
        // Homework
        .route("/homework", get(homework::list_homework))
        .route(
            "/homework/{date}",
            get(homework::get_day)
                .put(homework::put_day)
                .delete(homework::delete_day),
        )
        .route("/homework/{date}/{subject}", put(homework::set_entry))
        // Grades
        .route("/grades", get(grades::list_grades))
        .route("/grades/columns", get(grades::visible_columns))
        .route(
            "/grades/{subject}",
            get(grades::get_subject)
                .put(grades::put_subject)
                .delete(grades::delete_subject),
        )
        .route("/grades/{subject}/mark", put(grades::set_mark))
        .route("/grades/{subject}/average", get(grades::get_average))
        // Schedule
        .route(
            "/schedule",
            get(schedule::get_schedule).put(schedule::replace_schedule),
        )
        .route("/schedule/resolved", get(schedule::get_resolved))
        .route("/schedule/week", get(schedule::get_week))
        .route("/schedule/lessons", get(schedule::get_lessons))
        .route("/schedule/edit", put(schedule::edit_slot))
        .route("/schedule/{day}", get(schedule::get_day))
        .with_state(state)
}
