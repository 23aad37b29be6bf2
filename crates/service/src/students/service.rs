use std::sync::Arc;

use models::student::validate_required;
use tracing::{info, instrument, warn};

use super::domain::{
    new_student, to_view, CreateStudentInput, PageQuery, PagedResult, StudentView,
    UpdateStudentInput,
};
use super::repository::StudentRepository;
use crate::errors::ServiceError;
use crate::pagination::PageRequest;

/// Student records business service independent of web framework
pub struct StudentService<R: StudentRepository> {
    repo: Arc<R>,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<Option<StudentView>, ServiceError> {
        Ok(self.repo.get_by_id(id).await?.map(to_view))
    }

    /// Create a student unless its `ra` is already taken.
    ///
    /// The existence check is only a fast path: a concurrent insert that wins
    /// the race is caught by the storage unique index and reported the same way.
    ///
    /// # Examples
    /// ```
    /// use service::students::{StudentService, repository::mock::MockStudentRepository};
    /// use service::students::domain::CreateStudentInput;
    /// use service::errors::ServiceError;
    /// use std::sync::Arc;
    /// let svc = StudentService::new(Arc::new(MockStudentRepository::default()));
    /// let input = CreateStudentInput { name: "Ana".into(), email: "ana@email.com".into(), ra: "2024001".into(), cpf: "12345678901".into() };
    /// let created = tokio_test::block_on(svc.create(input.clone())).unwrap();
    /// assert_eq!(created.ra, "2024001");
    /// let again = tokio_test::block_on(svc.create(input));
    /// assert!(matches!(again, Err(ServiceError::Duplicate(_))));
    /// ```
    #[instrument(skip(self, input), fields(ra = %input.ra))]
    pub async fn create(&self, input: CreateStudentInput) -> Result<StudentView, ServiceError> {
        let new = new_student(input);
        new.validate()?;

        if self.repo.exists_by_ra(&new.ra).await? {
            warn!("ra already registered");
            return Err(ServiceError::duplicate_ra(&new.ra));
        }

        let ra = new.ra.clone();
        match self.repo.create(new).await {
            Ok(created) => {
                info!(id = created.id, "student_created");
                Ok(to_view(created))
            }
            Err(ServiceError::Duplicate(detail)) => {
                warn!(%detail, "ra registered concurrently");
                Err(ServiceError::duplicate_ra(&ra))
            }
            Err(e) => Err(e),
        }
    }

    /// Change `name` and `email`. Returns `false` when `id` does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, input: UpdateStudentInput) -> Result<bool, ServiceError> {
        validate_required("name", &input.name)?;
        validate_required("email", &input.email)?;

        let Some(mut student) = self.repo.get_by_id(id).await? else {
            return Ok(false);
        };
        student.name = input.name;
        student.email = input.email;

        match self.repo.update(student).await {
            Ok(_) => {
                info!("student_updated");
                Ok(true)
            }
            // deleted between read and write
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            info!("student_deleted");
        }
        Ok(deleted)
    }

    /// One page of students plus the total number matching the search.
    #[instrument(
        skip(self, query),
        fields(page = query.page_number, size = query.page_size, sort = query.sort().key.as_str())
    )]
    pub async fn get_paged(&self, query: &PageQuery) -> Result<PagedResult<StudentView>, ServiceError> {
        let search = query.search_term();
        let page = PageRequest::new(query.page_number, query.page_size);

        let rows = self.repo.list_page(search.as_ref(), query.sort(), page).await?;
        let total_items = self.repo.count(search.as_ref()).await?;

        Ok(PagedResult {
            items: rows.into_iter().map(to_view).collect(),
            total_items,
            page_number: query.page_number,
            page_size: query.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::domain::{NewStudent, SearchTerm, Student, StudentSort};
    use crate::students::repository::mock::MockStudentRepository;
    use crate::students::SeaOrmStudentRepository;
    use crate::test_support::get_db;

    fn joao() -> CreateStudentInput {
        CreateStudentInput {
            name: "João Silva".into(),
            email: "joao@email.com".into(),
            ra: "2024001".into(),
            cpf: "12345678901".into(),
        }
    }

    fn service() -> (StudentService<MockStudentRepository>, Arc<MockStudentRepository>) {
        let repo = Arc::new(MockStudentRepository::default());
        (StudentService::new(repo.clone()), repo)
    }

    async fn seed<R: StudentRepository>(svc: &StudentService<R>, n: usize) {
        for i in 1..=n {
            svc.create(CreateStudentInput {
                name: format!("Aluno {i}"),
                email: format!("aluno{i}@email.com"),
                ra: format!("2024{i:03}"),
                cpf: format!("123456789{i:02}"),
            })
            .await
            .unwrap();
        }
    }

    fn names(page: &PagedResult<StudentView>) -> Vec<String> {
        page.items.iter().map(|s| s.name.clone()).collect()
    }

    #[tokio::test]
    async fn get_by_id_returns_view_when_present() {
        let (svc, _) = service();
        let created = svc.create(joao()).await.unwrap();
        let found = svc.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.name, "João Silva");
        assert_eq!(found.cpf, "12345678901");
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let (svc, _) = service();
        assert!(svc.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_assigns_id() {
        let (svc, repo) = service();
        let created = svc.create(joao()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.ra, "2024001");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn create_duplicate_ra_leaves_store_unchanged() {
        let (svc, repo) = service();
        svc.create(joao()).await.unwrap();

        let maria = CreateStudentInput {
            name: "Maria Santos".into(),
            email: "maria@email.com".into(),
            ra: "2024001".into(),
            cpf: "12345678902".into(),
        };
        let err = svc.create(maria).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let (svc, repo) = service();
        let mut input = joao();
        input.email = " ".into();
        let err = svc.create(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(repo.is_empty());
    }

    /// Repository whose existence check always misses, as when a concurrent
    /// insert lands between the check and the write.
    struct StaleCheck(MockStudentRepository);

    #[async_trait::async_trait]
    impl StudentRepository for StaleCheck {
        async fn get_by_id(&self, id: i32) -> Result<Option<Student>, ServiceError> { self.0.get_by_id(id).await }
        async fn exists_by_ra(&self, _ra: &str) -> Result<bool, ServiceError> { Ok(false) }
        async fn create(&self, new: NewStudent) -> Result<Student, ServiceError> { self.0.create(new).await }
        async fn update(&self, s: Student) -> Result<Student, ServiceError> { self.0.update(s).await }
        async fn delete(&self, id: i32) -> Result<bool, ServiceError> { self.0.delete(id).await }
        async fn list_page(&self, search: Option<&SearchTerm>, sort: StudentSort, page: PageRequest) -> Result<Vec<Student>, ServiceError> {
            self.0.list_page(search, sort, page).await
        }
        async fn count(&self, search: Option<&SearchTerm>) -> Result<u64, ServiceError> { self.0.count(search).await }
    }

    #[tokio::test]
    async fn storage_level_conflict_reports_duplicate() {
        let repo = Arc::new(StaleCheck(MockStudentRepository::default()));
        let svc = StudentService::new(repo.clone());
        svc.create(joao()).await.unwrap();
        let err = svc.create(joao()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(ref m) if m.contains("2024001")));
        assert_eq!(repo.0.len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_contact_fields() {
        let (svc, _) = service();
        let created = svc.create(joao()).await.unwrap();

        let ok = svc
            .update(created.id, UpdateStudentInput { name: "João Silva Atualizado".into(), email: "joao.novo@email.com".into() })
            .await
            .unwrap();
        assert!(ok);

        let after = svc.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(after.name, "João Silva Atualizado");
        assert_eq!(after.email, "joao.novo@email.com");
        assert_eq!(after.ra, created.ra);
        assert_eq!(after.cpf, created.cpf);
    }

    #[tokio::test]
    async fn update_missing_reports_false() {
        let (svc, repo) = service();
        let ok = svc
            .update(999, UpdateStudentInput { name: "X".into(), email: "x@email.com".into() })
            .await
            .unwrap();
        assert!(!ok);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_existing_then_missing() {
        let (svc, _) = service();
        let created = svc.create(joao()).await.unwrap();
        assert!(svc.delete(created.id).await.unwrap());
        assert!(svc.get_by_id(created.id).await.unwrap().is_none());
        assert!(!svc.delete(created.id).await.unwrap());
        assert!(!svc.delete(999).await.unwrap());
    }

    #[tokio::test]
    async fn paged_returns_correct_page() {
        let (svc, _) = service();
        seed(&svc, 25).await;

        let page = svc.get_paged(&PageQuery::page(2, 10)).await.unwrap();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_items, 25);
        let expected: Vec<String> = (11..=20).map(|i| format!("Aluno {i}")).collect();
        assert_eq!(names(&page), expected);
    }

    #[tokio::test]
    async fn paged_last_page_returns_remaining_items() {
        let (svc, _) = service();
        seed(&svc, 23).await;

        let page = svc.get_paged(&PageQuery::page(3, 10)).await.unwrap();
        assert_eq!(page.page_number, 3);
        assert_eq!(names(&page), vec!["Aluno 21", "Aluno 22", "Aluno 23"]);
        assert_eq!(page.total_items, 23);
    }

    #[tokio::test]
    async fn paged_empty_store() {
        let (svc, _) = service();
        let page = svc.get_paged(&PageQuery::page(1, 10)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 10);
    }

    #[tokio::test]
    async fn paged_out_of_range_keeps_total() {
        let (svc, _) = service();
        seed(&svc, 5).await;
        let page = svc.get_paged(&PageQuery::page(7, 10)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 5);
    }

    #[tokio::test]
    async fn paged_search_filters_items_and_total() {
        let (svc, _) = service();
        seed(&svc, 12).await;
        let page = svc.get_paged(&PageQuery::page(1, 10).with_search("ALUNO 1")).await.unwrap();
        assert_eq!(page.total_items, 4);
        assert_eq!(names(&page), vec!["Aluno 1", "Aluno 10", "Aluno 11", "Aluno 12"]);

        let blank = svc.get_paged(&PageQuery::page(1, 100).with_search("   ")).await.unwrap();
        assert_eq!(blank.total_items, 12);
    }

    #[tokio::test]
    async fn paged_sorting() {
        let (svc, _) = service();
        for (name, ra) in [("Carla", "3"), ("Ana", "1"), ("Bruno", "2")] {
            svc.create(CreateStudentInput { name: name.into(), email: format!("{ra}@email.com"), ra: ra.into(), cpf: ra.into() })
                .await
                .unwrap();
        }

        let asc = svc.get_paged(&PageQuery::default().sorted_by("name", false)).await.unwrap();
        assert_eq!(names(&asc), vec!["Ana", "Bruno", "Carla"]);

        let desc = svc.get_paged(&PageQuery::default().sorted_by("name", true)).await.unwrap();
        assert_eq!(names(&desc), vec!["Carla", "Bruno", "Ana"]);

        // unknown keys fall back to ascending id, ignoring sortDesc
        let fallback = svc.get_paged(&PageQuery::default().sorted_by("Name", true)).await.unwrap();
        assert_eq!(names(&fallback), vec!["Carla", "Ana", "Bruno"]);
    }

    #[tokio::test]
    async fn full_lifecycle_on_database() -> Result<(), anyhow::Error> {
        let repo = Arc::new(SeaOrmStudentRepository::new(get_db().await?));
        let svc = StudentService::new(repo);
        let joao = CreateStudentInput { ra: "RA-JOAO".into(), ..joao() };

        let created = svc.create(joao.clone()).await?;
        assert_eq!(svc.get_by_id(created.id).await?, Some(created.clone()));
        assert!(matches!(svc.create(joao).await, Err(ServiceError::Duplicate(_))));

        assert!(svc.update(created.id, UpdateStudentInput { name: "Novo".into(), email: "novo@email.com".into() }).await?);
        assert!(!svc.update(999, UpdateStudentInput { name: "Novo".into(), email: "novo@email.com".into() }).await?);

        seed(&svc, 23).await;
        let page = svc.get_paged(&PageQuery::page(3, 10)).await?;
        assert_eq!(page.total_items, 24);
        // ids 21..=24, the first row being the one created above
        assert_eq!(names(&page), vec!["Aluno 20", "Aluno 21", "Aluno 22", "Aluno 23"]);

        assert!(svc.delete(created.id).await?);
        assert!(svc.get_by_id(created.id).await?.is_none());
        Ok(())
    }
}
