//! In-process student store.
//!
//! Backs `STORE=memory` and the HTTP integration tests. Filtering goes
//! through the same predicates the PostgreSQL store renders, and the
//! student number is kept unique the way the table constraint does.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Local;
use roster_models::{SortColumn, SortDirection, SortSpec, Student, StudentFilter, StudentForm};
use tokio::sync::RwLock;

use super::query::{Predicate, predicates};
use super::repository::{RepositoryError, StudentRepository};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Student>,
    last_id: i32,
}

impl Table {
    fn student_no_taken(&self, student_no: &str, except_id: Option<i32>) -> bool {
        self.rows
            .iter()
            .any(|s| s.student_no == student_no && Some(s.id) != except_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStudentRepository {
    table: RwLock<Table>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matching<'a>(
    rows: &'a [Student],
    predicates: &'a [Predicate],
) -> impl Iterator<Item = &'a Student> {
    rows.iter()
        .filter(move |s| predicates.iter().all(|p| p.matches(s)))
}

/// Ascending order with absent values last, matching PostgreSQL's default.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Student, b: &Student, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::StudentNo => a.student_no.cmp(&b.student_no),
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Gender => a.gender.cmp(&b.gender),
        SortColumn::Age => nulls_last(a.age, b.age),
        SortColumn::Major => nulls_last(a.major.as_ref(), b.major.as_ref()),
        SortColumn::ClassName => nulls_last(a.class_name.as_ref(), b.class_name.as_ref()),
        SortColumn::Phone => nulls_last(a.phone.as_ref(), b.phone.as_ref()),
        SortColumn::Email => nulls_last(a.email.as_ref(), b.email.as_ref()),
        SortColumn::EnrollmentDate => nulls_last(a.enrollment_date, b.enrollment_date),
        SortColumn::CreateTime => a.create_time.cmp(&b.create_time),
        SortColumn::UpdateTime => a.update_time.cmp(&b.update_time),
        SortColumn::Status => a.status.cmp(&b.status),
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn count(&self, filter: &StudentFilter) -> Result<i64, RepositoryError> {
        let table = self.table.read().await;
        let predicates = predicates(filter);
        Ok(matching(&table.rows, &predicates).count() as i64)
    }

    async fn find_page(
        &self,
        filter: &StudentFilter,
        sort: SortSpec,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Student>, RepositoryError> {
        let table = self.table.read().await;
        let predicates = predicates(filter);
        let mut rows: Vec<Student> = matching(&table.rows, &predicates).cloned().collect();

        rows.sort_by(|a, b| {
            let ordering = compare(a, b, sort.column);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_student_no(
        &self,
        student_no: &str,
    ) -> Result<Option<Student>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|s| s.student_no == student_no)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Student>, RepositoryError> {
        let table = self.table.read().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn insert(&self, form: &StudentForm) -> Result<Student, RepositoryError> {
        let mut table = self.table.write().await;
        if table.student_no_taken(&form.student_no, None) {
            return Err(RepositoryError::DuplicateStudentNo(form.student_no.clone()));
        }

        table.last_id += 1;
        let student = Student::from_form(table.last_id, form, Local::now().naive_local());
        table.rows.push(student.clone());
        Ok(student)
    }

    async fn update(&self, id: i32, form: &StudentForm) -> Result<u64, RepositoryError> {
        let mut table = self.table.write().await;
        if !table.rows.iter().any(|s| s.id == id) {
            return Ok(0);
        }
        if table.student_no_taken(&form.student_no, Some(id)) {
            return Err(RepositoryError::DuplicateStudentNo(form.student_no.clone()));
        }

        let now = Local::now().naive_local();
        if let Some(student) = table.rows.iter_mut().find(|s| s.id == id) {
            student.apply_form(form, now);
        }
        Ok(1)
    }

    async fn delete_by_id(&self, id: i32) -> Result<u64, RepositoryError> {
        self.delete_batch(&[id]).await
    }

    async fn delete_batch(&self, ids: &[i32]) -> Result<u64, RepositoryError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|s| !ids.contains(&s.id));
        Ok((before - table.rows.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut table = self.table.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(student_no: &str, name: &str, age: Option<i32>) -> StudentForm {
        StudentForm {
            student_no: student_no.to_string(),
            name: name.to_string(),
            gender: Some(2),
            age,
            status: Some(1),
            ..Default::default()
        }
    }

    async fn seeded() -> MemoryStudentRepository {
        let repo = MemoryStudentRepository::new();
        repo.insert(&form("S1", "Li Lei", Some(20))).await.unwrap();
        repo.insert(&form("S2", "Han Meimei", None)).await.unwrap();
        repo.insert(&form("S3", "Li Ming", Some(18))).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let repo = seeded().await;
        let ids: Vec<i32> = repo.find_all().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_duplicate_student_no_rejected() {
        let repo = seeded().await;
        let err = repo.insert(&form("S1", "Other", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateStudentNo(_)));

        let err = repo.update(2, &form("S1", "Han", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateStudentNo(_)));
        assert_eq!(repo.update(1, &form("S1", "Li Lei", None)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_filter_and_page() {
        let repo = seeded().await;
        let filter = StudentFilter {
            name: Some("Li".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 2);

        let page = repo
            .find_page(&filter, SortSpec::default(), 1, 10)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].student_no, "S1");
    }

    #[tokio::test]
    async fn test_sort_puts_missing_values_last_ascending() {
        let repo = seeded().await;
        let sort = SortSpec::from_params(Some("age"), Some("asc"));
        let page = repo
            .find_page(&StudentFilter::default(), sort, 0, 10)
            .await
            .unwrap();
        let ages: Vec<Option<i32>> = page.iter().map(|s| s.age).collect();
        assert_eq!(ages, vec![Some(18), Some(20), None]);
    }

    #[tokio::test]
    async fn test_deletes_report_affected_rows() {
        let repo = seeded().await;
        assert_eq!(repo.delete_by_id(42).await.unwrap(), 0);
        assert_eq!(repo.delete_batch(&[1, 3, 42]).await.unwrap(), 2);
        assert_eq!(repo.delete_all().await.unwrap(), 1);
        assert_eq!(repo.count(&StudentFilter::default()).await.unwrap(), 0);
    }
}
