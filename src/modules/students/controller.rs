use anyhow::anyhow;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use roster_core::serde::parse_date;
use roster_core::text::{non_blank, parse_int_or, parse_long_or};
use roster_core::{ApiResponse, AppError, PageRequest};
use tracing::{debug, instrument, warn};

use crate::modules::students::model::{SortSpec, StudentFilter, StudentForm, StudentStatus};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::params::RequestParams;

/// Non-blank text, trimmed.
fn trimmed(value: Option<&str>) -> Option<String> {
    non_blank(value).map(|v| v.trim().to_string())
}

fn required_id(params: &RequestParams) -> Result<i32, AppError> {
    params
        .int("id")
        .ok_or_else(|| AppError::bad_request(anyhow!("Student id is required")))
}

/// Listing filters. Blank values are treated as absent, as are non-numeric
/// gender or status values.
pub fn student_filter(params: &RequestParams) -> StudentFilter {
    StudentFilter {
        student_no: non_blank(params.get("studentNo")).map(str::to_string),
        name: non_blank(params.get("name")).map(str::to_string),
        gender: params.int("gender"),
        major: non_blank(params.get("major")).map(str::to_string),
        class_name: non_blank(params.get("className")).map(str::to_string),
        status: params.int("status"),
    }
}

/// The submitted student fields. An unparseable enrollment date is logged
/// and dropped; a missing status defaults to active.
pub fn student_form(params: &RequestParams) -> StudentForm {
    let enrollment_date = non_blank(params.get("enrollmentDate")).and_then(|raw| {
        let date = parse_date(raw);
        if date.is_none() {
            warn!(value = %raw, "Ignoring malformed enrollment date");
        }
        date
    });

    StudentForm {
        id: params.int("id"),
        student_no: trimmed(params.get("studentNo")).unwrap_or_default(),
        name: trimmed(params.get("name")).unwrap_or_default(),
        gender: params.int("gender"),
        age: params.int("age"),
        major: trimmed(params.get("major")),
        class_name: trimmed(params.get("className")),
        phone: trimmed(params.get("phone")),
        email: trimmed(params.get("email")),
        enrollment_date,
        status: Some(parse_int_or(
            params.get("status"),
            StudentStatus::DEFAULT_CODE,
        )),
    }
}

async fn query(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    let filter = student_filter(params);
    let sort = SortSpec::from_params(params.get("orderBy"), params.get("orderType"));
    let page = PageRequest::new(
        parse_long_or(params.get("currentPage"), 1),
        parse_long_or(params.get("pageSize"), 10),
    );

    let result = StudentService::query_page(state.students.as_ref(), filter, sort, page).await?;
    Ok(ApiResponse::success("Query succeeded", result).into_response())
}

async fn add(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    StudentService::add(state.students.as_ref(), student_form(params)).await?;
    Ok(ApiResponse::<()>::ok("Student added successfully").into_response())
}

async fn update(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    let id = required_id(params)?;
    let form = StudentForm {
        id: Some(id),
        ..student_form(params)
    };

    StudentService::update(state.students.as_ref(), form).await?;
    Ok(ApiResponse::<()>::ok("Student updated successfully").into_response())
}

async fn delete(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    let id = required_id(params)?;
    StudentService::delete(state.students.as_ref(), id).await?;
    Ok(ApiResponse::<()>::ok("Student deleted successfully").into_response())
}

async fn delete_batch(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    let raw_ids = params.get_all("ids[]");
    if raw_ids.is_empty() {
        return Err(AppError::bad_request(anyhow!(
            "Select at least one student to delete"
        )));
    }

    let ids = params.int_list("ids[]");
    let deleted = StudentService::delete_batch(state.students.as_ref(), &ids).await?;
    Ok(ApiResponse::<()>::ok(format!("Deleted {} record(s)", deleted)).into_response())
}

async fn get_by_id(state: &AppState, params: &RequestParams) -> Result<Response, AppError> {
    let id = required_id(params)?;
    let student = StudentService::get_by_id(state.students.as_ref(), id).await?;
    Ok(ApiResponse::success("Query succeeded", student).into_response())
}

/// Single student endpoint. The `action` parameter selects the operation:
/// `query`, `add`, `update`, `delete`, `deleteBatch` or `getById`.
#[utoipa::path(
    method(get, post),
    path = "/student",
    params(
        ("action" = String, Query, description = "query | add | update | delete | deleteBatch | getById"),
        ("id" = Option<i32>, Query, description = "Student id (update, delete, getById)"),
        ("ids[]" = Option<Vec<i32>>, Query, description = "Student ids (deleteBatch), repeated"),
        ("studentNo" = Option<String>, Query, description = "Student number; exact match when filtering"),
        ("name" = Option<String>, Query, description = "Name; substring match when filtering"),
        ("gender" = Option<i32>, Query, description = "1 = male, 2 = female"),
        ("age" = Option<i32>, Query, description = "1 to 150"),
        ("major" = Option<String>, Query, description = "Major; substring match when filtering"),
        ("className" = Option<String>, Query, description = "Class; substring match when filtering"),
        ("phone" = Option<String>, Query),
        ("email" = Option<String>, Query),
        ("enrollmentDate" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("status" = Option<i32>, Query, description = "1 = active, 2 = on leave, 3 = graduated"),
        ("orderBy" = Option<String>, Query, description = "Sort column, default id"),
        ("orderType" = Option<String>, Query, description = "ASC or DESC, default DESC"),
        ("currentPage" = Option<i64>, Query, description = "1-based page, default 1"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page, default 10"),
    ),
    responses(
        (status = 200, description = "Page of students for `query`, a single student (`StudentEnvelope`) for `getById`, otherwise a message only", body = crate::docs::StudentPageEnvelope),
        (status = 400, description = "Invalid input, duplicate student number, or unknown action", body = crate::docs::MessageEnvelope),
        (status = 500, description = "Storage failure or missing record", body = crate::docs::MessageEnvelope)
    ),
    tag = "Students"
)]
#[instrument(skip(state, params), fields(action = tracing::field::Empty))]
pub async fn student_endpoint(
    State(state): State<AppState>,
    params: RequestParams,
) -> Result<Response, AppError> {
    let Some(action) = params.get("action") else {
        return Err(AppError::bad_request(anyhow!("Action is required")));
    };
    tracing::Span::current().record("action", action);
    debug!(params = params.len(), "Dispatching student action");

    match action {
        "query" => query(&state, &params).await,
        "add" => add(&state, &params).await,
        "update" => update(&state, &params).await,
        "delete" => delete(&state, &params).await,
        "deleteBatch" => delete_batch(&state, &params).await,
        "getById" => get_by_id(&state, &params).await,
        other => Err(AppError::bad_request(anyhow!("Unknown action: {}", other))),
    }
}
