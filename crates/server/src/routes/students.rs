use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderName, StatusCode},
    Json,
};
use service::errors::ServiceError;
use service::students::domain::{
    CreateStudentInput, PageQuery, PagedResult, StudentView, UpdateStudentInput,
};
use tracing::{error, info};

use crate::{errors::JsonApiError, routes::ServerState};

/// Message returned for a rejected create, duplicate or not.
const CREATE_REJECTED: &str = "Invalid data or RA already exists.";

pub fn location(id: i32) -> String {
    format!("/v1/students/{id}")
}

#[utoipa::path(
    get, path = "/v1/students/paged", tag = "students",
    params(
        ("pageNumber" = Option<u64>, Query, description = "1-based page number, default 1"),
        ("pageSize" = Option<u64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive text matched against name, email, ra and cpf"),
        ("sortBy" = Option<String>, Query, description = "name | email | ra | cpf; anything else sorts by id"),
        ("sortDesc" = Option<bool>, Query, description = "Descending order for named sorts")
    ),
    responses(
        (status = 200, description = "Page of students", body = crate::openapi::PagedStudentsDoc),
        (status = 400, description = "Malformed query"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_paged(
    State(state): State<ServerState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResult<StudentView>>, JsonApiError> {
    let Query(q) = query?;
    match state.students.get_paged(&q).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            error!(err = %e, page_number = q.page_number, page_size = q.page_size, "get paged students failed");
            Err(JsonApiError::internal())
        }
    }
}

#[utoipa::path(
    get, path = "/v1/students/{id}", tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::StudentViewDoc),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_by_id(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<StudentView>, JsonApiError> {
    let Path(id) = path?;
    match state.students.get_by_id(id).await {
        Ok(Some(s)) => Ok(Json(s)),
        Ok(None) => Err(JsonApiError::not_found()),
        Err(e) => {
            error!(err = %e, id, "get student by id failed");
            Err(JsonApiError::internal())
        }
    }
}

#[utoipa::path(
    post, path = "/v1/students", tag = "students",
    request_body = crate::openapi::CreateStudentDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::StudentViewDoc),
        (status = 400, description = "Invalid data or RA already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CreateStudentInput>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<StudentView>), JsonApiError> {
    let Json(input) = payload?;
    let ra = input.ra.clone();
    match state.students.create(input).await {
        Ok(s) => {
            info!(id = s.id, ra = %s.ra, "created student");
            Ok((StatusCode::CREATED, [(header::LOCATION, location(s.id))], Json(s)))
        }
        Err(e @ (ServiceError::Validation(_) | ServiceError::Duplicate(_))) => {
            Err(JsonApiError::new(StatusCode::BAD_REQUEST, CREATE_REJECTED, Some(e.to_string())))
        }
        Err(e) => {
            error!(err = %e, %ra, "create student failed");
            Err(JsonApiError::internal())
        }
    }
}

#[utoipa::path(
    put, path = "/v1/students/{id}", tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = crate::openapi::UpdateStudentDoc,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStudentInput>, JsonRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    match state.students.update(id, input).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(JsonApiError::not_found()),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete, path = "/v1/students/{id}", tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = path?;
    match state.students.delete(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(JsonApiError::not_found()),
        Err(e) => {
            error!(err = %e, id, "delete student failed");
            Err(JsonApiError::internal())
        }
    }
}
