use anyhow::{Context, anyhow};
use roster_core::{AppError, PageRequest, PageResult};
use roster_models::{SortSpec, Student, StudentFilter, StudentForm, StudentResponse};
use tracing::{error, info, instrument};

use super::repository::{RepositoryError, StudentRepository};
use super::validation::{FormMode, validate_student};

/// Whether `existing` blocks a record from using its student number.
/// A record never conflicts with itself.
pub fn is_duplicate(existing: Option<&Student>, exclude_id: Option<i32>) -> bool {
    match (existing, exclude_id) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(student), Some(id)) => student.id != id,
    }
}

/// Turns a storage failure into a 500 carrying `context`.
fn storage_error(e: RepositoryError, context: &'static str) -> AppError {
    error!(error = %e, "{}", context);
    AppError::database(anyhow!(e).context(context))
}

fn duplicate_on_add(student_no: &str) -> AppError {
    AppError::bad_request(anyhow!("Student number {} already exists", student_no))
}

fn duplicate_on_update(student_no: &str) -> AppError {
    AppError::bad_request(anyhow!(
        "Student number {} is already used by another student",
        student_no
    ))
}

pub struct StudentService;

impl StudentService {
    /// Lists one page of students. Out-of-range paging input falls back to
    /// page 1 and size 10.
    #[instrument(skip(repo))]
    pub async fn query_page(
        repo: &dyn StudentRepository,
        filter: StudentFilter,
        sort: SortSpec,
        page: PageRequest,
    ) -> Result<PageResult<StudentResponse>, AppError> {
        let page = page.normalized();

        let total = repo
            .count(&filter)
            .await
            .map_err(|e| storage_error(e, "Query failed"))?;
        if total == 0 {
            return Ok(PageResult::empty(page.current_page, page.page_size));
        }

        let students = repo
            .find_page(&filter, sort, page.offset(), page.limit())
            .await
            .map_err(|e| storage_error(e, "Query failed"))?;

        Ok(
            PageResult::new(page.current_page, page.page_size, total, students)
                .map(StudentResponse::from),
        )
    }

    #[instrument(skip(repo))]
    pub async fn get_by_id(
        repo: &dyn StudentRepository,
        id: i32,
    ) -> Result<StudentResponse, AppError> {
        let student = if id > 0 {
            repo.find_by_id(id)
                .await
                .map_err(|e| storage_error(e, "Query failed"))?
        } else {
            None
        };

        student
            .map(StudentResponse::from)
            .ok_or_else(|| AppError::internal(anyhow!("Student not found")))
    }

    #[instrument(skip(repo))]
    pub async fn is_student_no_taken(
        repo: &dyn StudentRepository,
        student_no: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        if student_no.trim().is_empty() {
            return Ok(false);
        }

        let existing = repo
            .find_by_student_no(student_no)
            .await
            .map_err(|e| storage_error(e, "Failed to check student number"))?;

        Ok(is_duplicate(existing.as_ref(), exclude_id))
    }

    #[instrument(skip(repo, form), fields(student_no = %form.student_no))]
    pub async fn add(repo: &dyn StudentRepository, form: StudentForm) -> Result<Student, AppError> {
        validate_student(&form, FormMode::Add)?;

        if Self::is_student_no_taken(repo, &form.student_no, None).await? {
            return Err(duplicate_on_add(&form.student_no));
        }

        let student = repo.insert(&form).await.map_err(|e| match e {
            RepositoryError::DuplicateStudentNo(no) => duplicate_on_add(&no),
            other => storage_error(other, "Failed to add student"),
        })?;

        info!(id = student.id, "Student added");
        Ok(student)
    }

    #[instrument(skip(repo, form), fields(id = ?form.id, student_no = %form.student_no))]
    pub async fn update(repo: &dyn StudentRepository, form: StudentForm) -> Result<(), AppError> {
        validate_student(&form, FormMode::Update)?;
        let id = form
            .id
            .context("Student id is required")
            .map_err(AppError::bad_request)?;

        if Self::is_student_no_taken(repo, &form.student_no, Some(id)).await? {
            return Err(duplicate_on_update(&form.student_no));
        }

        let affected = repo.update(id, &form).await.map_err(|e| match e {
            RepositoryError::DuplicateStudentNo(no) => duplicate_on_update(&no),
            other => storage_error(other, "Failed to update student"),
        })?;

        if affected == 0 {
            return Err(AppError::internal(anyhow!("Failed to update student")));
        }

        info!(id, "Student updated");
        Ok(())
    }

    #[instrument(skip(repo))]
    pub async fn delete(repo: &dyn StudentRepository, id: i32) -> Result<(), AppError> {
        let affected = if id > 0 {
            repo.delete_by_id(id)
                .await
                .map_err(|e| storage_error(e, "Failed to delete student"))?
        } else {
            0
        };

        if affected == 0 {
            return Err(AppError::internal(anyhow!("Failed to delete student")));
        }

        info!(id, "Student deleted");
        Ok(())
    }

    /// Deletes every listed student, returning how many rows went away.
    /// Removing nothing counts as a failure.
    #[instrument(skip(repo))]
    pub async fn delete_batch(repo: &dyn StudentRepository, ids: &[i32]) -> Result<u64, AppError> {
        let affected = if ids.is_empty() {
            0
        } else {
            repo.delete_batch(ids)
                .await
                .map_err(|e| storage_error(e, "Batch delete failed"))?
        };

        if affected == 0 {
            return Err(AppError::internal(anyhow!("Batch delete failed")));
        }

        info!(requested = ids.len(), deleted = affected, "Students deleted in batch");
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::students::memory::MemoryStudentRepository;
    use axum::http::StatusCode;

    fn form(student_no: &str, name: &str) -> StudentForm {
        StudentForm {
            student_no: student_no.to_string(),
            name: name.to_string(),
            gender: Some(1),
            status: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_duplicate_rules() {
        let repo_row = {
            let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            Student::from_form(5, &form("S1", "Li"), now)
        };

        assert!(!is_duplicate(None, None));
        assert!(!is_duplicate(None, Some(5)));
        assert!(is_duplicate(Some(&repo_row), None));
        assert!(!is_duplicate(Some(&repo_row), Some(5)));
        assert!(is_duplicate(Some(&repo_row), Some(6)));
    }

    #[tokio::test]
    async fn test_student_no_taken_lookup() {
        let repo = MemoryStudentRepository::new();
        let created = StudentService::add(&repo, form("S1", "Li")).await.unwrap();

        assert!(StudentService::is_student_no_taken(&repo, "S1", None).await.unwrap());
        assert!(
            !StudentService::is_student_no_taken(&repo, "S1", Some(created.id))
                .await
                .unwrap()
        );
        assert!(
            StudentService::is_student_no_taken(&repo, "S1", Some(created.id + 1))
                .await
                .unwrap()
        );
        assert!(!StudentService::is_student_no_taken(&repo, "S2", None).await.unwrap());
        assert!(!StudentService::is_student_no_taken(&repo, "  ", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate() {
        let repo = MemoryStudentRepository::new();
        StudentService::add(&repo, form("S100", "Li")).await.unwrap();

        let err = StudentService::add(&repo, form("S100", "Wang"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Student number S100 already exists");
    }

    #[tokio::test]
    async fn test_update_keeps_own_number_but_not_anothers() {
        let repo = MemoryStudentRepository::new();
        let li = StudentService::add(&repo, form("S1", "Li")).await.unwrap();
        StudentService::add(&repo, form("S2", "Wang")).await.unwrap();

        let same_number = StudentForm {
            id: Some(li.id),
            name: "Li Lei".to_string(),
            ..form("S1", "Li")
        };
        StudentService::update(&repo, same_number).await.unwrap();

        let taken = StudentForm {
            id: Some(li.id),
            ..form("S2", "Li")
        };
        let err = StudentService::update(&repo, taken).await.unwrap_err();
        assert_eq!(
            err.message(),
            "Student number S2 is already used by another student"
        );
    }

    #[tokio::test]
    async fn test_update_of_missing_row_fails() {
        let repo = MemoryStudentRepository::new();
        let ghost = StudentForm {
            id: Some(77),
            ..form("S1", "Li")
        };
        let err = StudentService::update(&repo, ghost).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to update student");
    }

    #[tokio::test]
    async fn test_query_page_normalizes_paging() {
        let repo = MemoryStudentRepository::new();
        for i in 1..=12 {
            StudentService::add(&repo, form(&format!("S{i}"), "Li"))
                .await
                .unwrap();
        }

        let page = StudentService::query_page(
            &repo,
            StudentFilter::default(),
            SortSpec::default(),
            PageRequest::new(0, -1),
        )
        .await
        .unwrap();

        assert_eq!(page.current_page(), 1);
        assert_eq!(page.page_size(), 10);
        assert_eq!(page.total_count(), 12);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.data().len(), 10);
        assert_eq!(page.data()[0].student_no, "S12");
    }

    #[tokio::test]
    async fn test_query_page_far_past_the_end() {
        let repo = MemoryStudentRepository::new();
        StudentService::add(&repo, form("S1", "Li")).await.unwrap();

        let page = StudentService::query_page(
            &repo,
            StudentFilter::default(),
            SortSpec::default(),
            PageRequest::new(i64::MAX, i64::MAX),
        )
        .await
        .unwrap();
        assert_eq!(page.total_count(), 1);
        assert_eq!(page.total_pages(), 1);
        assert!(page.data().is_empty());

        let none = StudentService::query_page(
            &repo,
            StudentFilter {
                name: Some("Nobody".to_string()),
                ..Default::default()
            },
            SortSpec::default(),
            PageRequest::new(2, 5),
        )
        .await
        .unwrap();
        assert_eq!(none.current_page(), 2);
        assert_eq!(none.total_pages(), 0);
        assert!(none.data().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_miss_is_server_error() {
        let repo = MemoryStudentRepository::new();
        for id in [0, 9] {
            let err = StudentService::get_by_id(&repo, id).await.unwrap_err();
            assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.message(), "Student not found");
        }
    }

    #[tokio::test]
    async fn test_deletes() {
        let repo = MemoryStudentRepository::new();
        let a = StudentService::add(&repo, form("S1", "Li")).await.unwrap();
        let b = StudentService::add(&repo, form("S2", "Wang")).await.unwrap();
        let c = StudentService::add(&repo, form("S3", "Zhang")).await.unwrap();

        StudentService::delete(&repo, a.id).await.unwrap();
        let err = StudentService::delete(&repo, a.id).await.unwrap_err();
        assert_eq!(err.message(), "Failed to delete student");

        assert_eq!(
            StudentService::delete_batch(&repo, &[b.id, c.id, 99])
                .await
                .unwrap(),
            2
        );
        let err = StudentService::delete_batch(&repo, &[]).await.unwrap_err();
        assert_eq!(err.message(), "Batch delete failed");
    }
}
