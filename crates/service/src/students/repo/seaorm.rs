use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use models::student::{self, Column, Entity as StudentEntity};

use crate::errors::ServiceError;
use crate::pagination::PageRequest;
use crate::students::domain::{NewStudent, SearchTerm, SortKey, Student, StudentSort};
use crate::students::repository::StudentRepository;

const SEARCH_COLUMNS: [Column; 4] = [Column::Name, Column::Email, Column::Ra, Column::Cpf];

pub struct SeaOrmStudentRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// SQLite's `LOWER()` only folds ASCII, so there the search runs on Unicode
    /// lower-cased values in process instead of in SQL.
    fn sql_search(&self) -> bool {
        self.db.get_database_backend() != DbBackend::Sqlite
    }

    /// Every row matching `search` in `sort` order, filtered in process.
    async fn folded_matches(&self, term: &SearchTerm, sort: StudentSort) -> Result<Vec<Student>, ServiceError> {
        let rows = sorted(StudentEntity::find(), sort).all(&self.db).await?;
        Ok(rows.into_iter().filter(|s| term.matches(fields(s))).collect())
    }
}

fn fields(s: &Student) -> [&str; 4] {
    [s.name.as_str(), s.email.as_str(), s.ra.as_str(), s.cpf.as_str()]
}

fn sorted(select: Select<StudentEntity>, sort: StudentSort) -> Select<StudentEntity> {
    let order = if sort.descending { Order::Desc } else { Order::Asc };
    let select = select.order_by(sort_column(sort.key), order);
    if sort.key == SortKey::Id {
        return select;
    }
    // stable pages when the sort column has ties
    select.order_by_asc(Column::Id)
}

/// `LOWER(col) LIKE '%term%'` over every searchable column, OR-ed together.
fn search_condition(search: Option<&SearchTerm>) -> Condition {
    let Some(term) = search else { return Condition::all(); };
    let pattern = term.like_pattern();
    SEARCH_COLUMNS.into_iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col((StudentEntity, col))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

fn sort_column(key: SortKey) -> Column {
    match key {
        SortKey::Id => Column::Id,
        SortKey::Name => Column::Name,
        SortKey::Email => Column::Email,
        SortKey::Ra => Column::Ra,
        SortKey::Cpf => Column::Cpf,
    }
}

#[async_trait::async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn get_by_id(&self, id: i32) -> Result<Option<Student>, ServiceError> {
        Ok(StudentEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn exists_by_ra(&self, ra: &str) -> Result<bool, ServiceError> {
        let n = StudentEntity::find()
            .filter(Column::Ra.eq(ra))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn create(&self, new: NewStudent) -> Result<Student, ServiceError> {
        Ok(student::create(&self.db, new).await?)
    }

    async fn update(&self, s: Student) -> Result<Student, ServiceError> {
        Ok(student::save_contact(&self.db, s).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let res = StudentEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn list_page(
        &self,
        search: Option<&SearchTerm>,
        sort: StudentSort,
        page: PageRequest,
    ) -> Result<Vec<Student>, ServiceError> {
        if let Some(term) = search.filter(|_| !self.sql_search()) {
            let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
            let rows = self.folded_matches(term, sort).await?;
            return Ok(rows.into_iter().skip(skip).take(take).collect());
        }
        let rows = sorted(StudentEntity::find().filter(search_condition(search)), sort)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn count(&self, search: Option<&SearchTerm>) -> Result<u64, ServiceError> {
        if let Some(term) = search.filter(|_| !self.sql_search()) {
            let rows = self.folded_matches(term, StudentSort::default()).await?;
            return Ok(rows.len() as u64);
        }
        let n = StudentEntity::find()
            .filter(search_condition(search))
            .count(&self.db)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    async fn seeded(n: usize) -> Result<SeaOrmStudentRepository, anyhow::Error> {
        let repo = SeaOrmStudentRepository::new(get_db().await?);
        for i in 1..=n {
            repo.create(NewStudent {
                name: format!("Aluno {i}"),
                email: format!("aluno{i}@email.com"),
                ra: format!("2024{i:03}"),
                cpf: format!("123456789{i:02}"),
            })
            .await?;
        }
        Ok(repo)
    }

    fn names(rows: &[Student]) -> Vec<String> {
        rows.iter().map(|s| s.name.clone()).collect()
    }

    #[tokio::test]
    async fn second_page_in_id_order() -> Result<(), anyhow::Error> {
        let repo = seeded(25).await?;
        let rows = repo.list_page(None, StudentSort::default(), PageRequest::new(2, 10)).await?;
        let expected: Vec<String> = (11..=20).map(|i| format!("Aluno {i}")).collect();
        assert_eq!(names(&rows), expected);
        assert_eq!(repo.count(None).await?, 25);
        Ok(())
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() -> Result<(), anyhow::Error> {
        let repo = seeded(3).await?;
        let rows = repo.list_page(None, StudentSort::default(), PageRequest::new(9, 10)).await?;
        assert!(rows.is_empty());
        let rows = repo.list_page(None, StudentSort::default(), PageRequest::new(u64::MAX, u64::MAX)).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_columns() -> Result<(), anyhow::Error> {
        let repo = seeded(12).await?;

        let by_name = SearchTerm::parse(Some("ALUNO 1")).unwrap();
        // Aluno 1, 10, 11, 12
        assert_eq!(repo.count(Some(&by_name)).await?, 4);

        let by_email = SearchTerm::parse(Some("ALUNO7@")).unwrap();
        let rows = repo.list_page(Some(&by_email), StudentSort::default(), PageRequest::default()).await?;
        assert_eq!(names(&rows), vec!["Aluno 7".to_string()]);

        let by_ra = SearchTerm::parse(Some("2024012")).unwrap();
        assert_eq!(repo.count(Some(&by_ra)).await?, 1);

        let by_cpf = SearchTerm::parse(Some("78903")).unwrap();
        assert_eq!(repo.count(Some(&by_cpf)).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn like_wildcards_are_literal() -> Result<(), anyhow::Error> {
        let repo = seeded(3).await?;
        let pct = SearchTerm::parse(Some("%")).unwrap();
        assert_eq!(repo.count(Some(&pct)).await?, 0);
        let underscore = SearchTerm::parse(Some("aluno_")).unwrap();
        assert_eq!(repo.count(Some(&underscore)).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn sorts_by_named_column_descending() -> Result<(), anyhow::Error> {
        let repo = seeded(3).await?;
        let rows = repo
            .list_page(None, StudentSort::parse(Some("ra"), true), PageRequest::default())
            .await?;
        assert_eq!(names(&rows), vec!["Aluno 3", "Aluno 2", "Aluno 1"]);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_ra_maps_to_duplicate_error() -> Result<(), anyhow::Error> {
        let repo = seeded(1).await?;
        let err = repo
            .create(NewStudent { name: "Maria".into(), email: "maria@email.com".into(), ra: "2024001".into(), cpf: "1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)), "got {err:?}");
        assert!(repo.exists_by_ra("2024001").await?);
        assert!(!repo.exists_by_ra("2024002").await?);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows() -> Result<(), anyhow::Error> {
        let repo = seeded(1).await?;
        let mut ghost = repo.get_by_id(1).await?.unwrap();
        ghost.id = 42;
        assert!(matches!(repo.update(ghost).await, Err(ServiceError::NotFound(_))));
        assert!(!repo.delete(42).await?);
        assert!(repo.delete(1).await?);
        assert!(repo.get_by_id(1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn search_folds_accented_letters() -> Result<(), anyhow::Error> {
        let repo = seeded(2).await?;
        repo.create(NewStudent {
            name: "JOÃO SILVA".into(),
            email: "joao@email.com".into(),
            ra: "RA-JOAO".into(),
            cpf: "99999999999".into(),
        })
        .await?;

        let term = SearchTerm::parse(Some("joão")).unwrap();
        assert_eq!(repo.count(Some(&term)).await?, 1);
        let rows = repo.list_page(Some(&term), StudentSort::default(), PageRequest::default()).await?;
        assert_eq!(names(&rows), vec!["JOÃO SILVA".to_string()]);

        let term = SearchTerm::parse(Some("Ão s")).unwrap();
        assert_eq!(repo.count(Some(&term)).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn in_process_search_pages_and_sorts() -> Result<(), anyhow::Error> {
        let repo = seeded(25).await?;
        let term = SearchTerm::parse(Some("ALUNO2")).unwrap();
        let rows = repo
            .list_page(Some(&term), StudentSort::parse(Some("ra"), true), PageRequest::new(2, 3))
            .await?;
        // aluno2@, aluno20@..aluno25@ by descending ra: 25 24 23 | 22 21 20 | 2
        assert_eq!(names(&rows), vec!["Aluno 22", "Aluno 21", "Aluno 20"]);
        assert_eq!(repo.count(Some(&term)).await?, 7);
        Ok(())
    }
}
