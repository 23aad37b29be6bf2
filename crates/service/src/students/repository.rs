use async_trait::async_trait;

use super::domain::{NewStudent, SearchTerm, Student, StudentSort};
use crate::errors::ServiceError;
use crate::pagination::PageRequest;

/// Storage accessor for student rows.
///
/// `create` must report a violated `ra` uniqueness constraint as
/// [`ServiceError::Duplicate`], whatever the backend calls it.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> Result<Option<Student>, ServiceError>;
    async fn exists_by_ra(&self, ra: &str) -> Result<bool, ServiceError>;
    async fn create(&self, new: NewStudent) -> Result<Student, ServiceError>;
    /// Persists `name` and `email`; fails with `NotFound` if the row vanished.
    async fn update(&self, student: Student) -> Result<Student, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;

    async fn list_page(
        &self,
        search: Option<&SearchTerm>,
        sort: StudentSort,
        page: PageRequest,
    ) -> Result<Vec<Student>, ServiceError>;
    async fn count(&self, search: Option<&SearchTerm>) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use crate::students::domain::SortKey;

    #[derive(Default)]
    struct State {
        rows: BTreeMap<i32, Student>, // key: id
        last_id: i32,
    }

    #[derive(Default)]
    pub struct MockStudentRepository {
        state: Mutex<State>,
    }

    impl MockStudentRepository {
        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub fn len(&self) -> usize {
            self.state().rows.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    fn matches(s: &Student, search: Option<&SearchTerm>) -> bool {
        search.map_or(true, |t| t.matches([s.name.as_str(), s.email.as_str(), s.ra.as_str(), s.cpf.as_str()]))
    }

    fn compare(a: &Student, b: &Student, sort: StudentSort) -> Ordering {
        let primary = match sort.key {
            SortKey::Id => Ordering::Equal,
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Email => a.email.cmp(&b.email),
            SortKey::Ra => a.ra.cmp(&b.ra),
            SortKey::Cpf => a.cpf.cmp(&b.cpf),
        };
        let primary = if sort.descending { primary.reverse() } else { primary };
        primary.then(a.id.cmp(&b.id))
    }

    #[async_trait]
    impl StudentRepository for MockStudentRepository {
        async fn get_by_id(&self, id: i32) -> Result<Option<Student>, ServiceError> {
            Ok(self.state().rows.get(&id).cloned())
        }

        async fn exists_by_ra(&self, ra: &str) -> Result<bool, ServiceError> {
            Ok(self.state().rows.values().any(|s| s.ra == ra))
        }

        async fn create(&self, new: NewStudent) -> Result<Student, ServiceError> {
            let mut state = self.state();
            // behaves like the unique index on `ra`
            if state.rows.values().any(|s| s.ra == new.ra) {
                return Err(ServiceError::Duplicate(format!("uniq_student_ra: {}", new.ra)));
            }
            state.last_id += 1;
            let student = Student { id: state.last_id, name: new.name, email: new.email, ra: new.ra, cpf: new.cpf };
            state.rows.insert(student.id, student.clone());
            Ok(student)
        }

        async fn update(&self, student: Student) -> Result<Student, ServiceError> {
            let mut state = self.state();
            let row = state
                .rows
                .get_mut(&student.id)
                .ok_or_else(|| ServiceError::not_found("student"))?;
            row.name = student.name;
            row.email = student.email;
            Ok(row.clone())
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.state().rows.remove(&id).is_some())
        }

        async fn list_page(
            &self,
            search: Option<&SearchTerm>,
            sort: StudentSort,
            page: PageRequest,
        ) -> Result<Vec<Student>, ServiceError> {
            let state = self.state();
            let mut rows: Vec<Student> = state.rows.values().filter(|s| matches(s, search)).cloned().collect();
            rows.sort_by(|a, b| compare(a, b, sort));
            let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
            Ok(rows.into_iter().skip(skip).take(take).collect())
        }

        async fn count(&self, search: Option<&SearchTerm>) -> Result<u64, ServiceError> {
            Ok(self.state().rows.values().filter(|s| matches(s, search)).count() as u64)
        }
    }
}
