use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::students::{SeaOrmStudentRepository, StudentService};

use crate::openapi::ApiDoc;

pub mod students;

pub type Students = StudentService<SeaOrmStudentRepository>;

#[derive(Clone)]
pub struct ServerState {
    pub students: Arc<Students>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmStudentRepository::new(db));
        Self { students: Arc::new(StudentService::new(repo)) }
    }
}

#[utoipa::path(
    get, path = "/healthz", tag = "health",
    responses((status = 200, description = "OK", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: student API, health probe and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/v1/students", axum::routing::post(students::create))
        .route("/v1/students/paged", get(students::get_paged))
        .route(
            "/v1/students/:id",
            get(students::get_by_id).put(students::update).delete(students::delete),
        )
        .with_state(state);

    Router::new()
        .route("/healthz", get(health))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
