use serde::Serialize;

pub mod student;

pub use student::{
    CreateStudentInput, PageQuery, PagedResult, SearchTerm, SortKey, StudentSort, StudentView,
    UpdateStudentInput,
};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}
