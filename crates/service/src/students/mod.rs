//! Student records: three-layer architecture (domain, repository, service).
//!
//! The HTTP layer only talks to [`StudentService`]; storage sits behind
//! [`repository::StudentRepository`].

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use repo::seaorm::SeaOrmStudentRepository;
pub use service::StudentService;
