pub use common::types::{
    CreateStudentInput, PageQuery, PagedResult, SearchTerm, SortKey, StudentSort, StudentView,
    UpdateStudentInput,
};
pub use models::student::{Model as Student, NewStudent};

/// Project a persisted row onto its external read shape.
pub fn to_view(s: Student) -> StudentView {
    StudentView { id: s.id, name: s.name, email: s.email, ra: s.ra, cpf: s.cpf }
}

pub fn new_student(input: CreateStudentInput) -> NewStudent {
    NewStudent { name: input.name, email: input.email, ra: input.ra, cpf: input.cpf }
}
