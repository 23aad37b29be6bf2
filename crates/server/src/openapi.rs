use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[schema(example = json!({"id": 1, "name": "Maria Silva", "email": "maria@email.com", "ra": "2024001", "cpf": "12345678901"}))]
pub struct StudentViewDoc {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

#[derive(ToSchema)]
pub struct CreateStudentDoc {
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

/// `ra` and `cpf` are immutable after creation.
#[derive(ToSchema)]
pub struct UpdateStudentDoc {
    pub name: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedStudentsDoc {
    pub items: Vec<StudentViewDoc>,
    pub total_items: u64,
    pub page_number: u64,
    pub page_size: u64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::get_paged,
        crate::routes::students::get_by_id,
        crate::routes::students::create,
        crate::routes::students::update,
        crate::routes::students::delete,
    ),
    components(
        schemas(
            HealthResponse,
            StudentViewDoc,
            CreateStudentDoc,
            UpdateStudentDoc,
            PagedStudentsDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "students", description = "Student records")
    )
)]
pub struct ApiDoc;
