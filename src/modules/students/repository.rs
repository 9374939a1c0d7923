use async_trait::async_trait;
use roster_models::{SortSpec, Student, StudentFilter, StudentForm};
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::query::{Value, predicates, render};

const STUDENT_COLUMNS: &str = "id, student_no, name, gender, age, major, class_name, phone, \
                               email, enrollment_date, create_time, update_time, status";

/// Error type for student storage.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Student number {0} already exists")]
    DuplicateStudentNo(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for student rows.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn count(&self, filter: &StudentFilter) -> Result<i64, RepositoryError>;

    async fn find_page(
        &self,
        filter: &StudentFilter,
        sort: SortSpec,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Student>, RepositoryError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, RepositoryError>;

    async fn find_by_student_no(
        &self,
        student_no: &str,
    ) -> Result<Option<Student>, RepositoryError>;

    /// Every row, newest id first.
    async fn find_all(&self) -> Result<Vec<Student>, RepositoryError>;

    async fn insert(&self, form: &StudentForm) -> Result<Student, RepositoryError>;

    /// Overwrites row `id` from `form`. Returns the number of rows changed.
    async fn update(&self, id: i32, form: &StudentForm) -> Result<u64, RepositoryError>;

    async fn delete_by_id(&self, id: i32) -> Result<u64, RepositoryError>;

    async fn delete_batch(&self, ids: &[i32]) -> Result<u64, RepositoryError>;

    async fn delete_all(&self) -> Result<u64, RepositoryError>;
}

/// Maps a unique violation on the student number to
/// [`RepositoryError::DuplicateStudentNo`].
fn map_write_error(e: sqlx::Error, student_no: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return RepositoryError::DuplicateStudentNo(student_no.to_string());
    }
    RepositoryError::Database(e)
}

#[derive(Clone, Debug)]
pub struct PgStudentRepository {
    db: PgPool,
}

impl PgStudentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &StudentFilter) -> Result<i64, RepositoryError> {
        let clause = render(&predicates(filter), 1);
        let sql = format!("SELECT COUNT(*) FROM student WHERE 1=1{}", clause.sql);
        debug!(sql = %sql, params = clause.binds.len(), "Counting students");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in clause.binds {
            query = match value {
                Value::Text(s) => query.bind(s),
                Value::Int(i) => query.bind(i),
            };
        }

        Ok(query.fetch_one(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        filter: &StudentFilter,
        sort: SortSpec,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Student>, RepositoryError> {
        let clause = render(&predicates(filter), 1);
        let limit_idx = clause.binds.len() + 1;
        let sql = format!(
            "SELECT {} FROM student WHERE 1=1{} ORDER BY {} LIMIT ${} OFFSET ${}",
            STUDENT_COLUMNS,
            clause.sql,
            sort.to_sql(),
            limit_idx,
            limit_idx + 1
        );
        debug!(sql = %sql, params = clause.binds.len() + 2, "Selecting student page");

        let mut query = sqlx::query_as::<_, Student>(&sql);
        for value in clause.binds {
            query = match value {
                Value::Text(s) => query.bind(s),
                Value::Int(i) => query.bind(i),
            };
        }

        Ok(query.bind(limit).bind(offset).fetch_all(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, RepositoryError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(student)
    }

    #[instrument(skip(self))]
    async fn find_by_student_no(
        &self,
        student_no: &str,
    ) -> Result<Option<Student>, RepositoryError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student WHERE student_no = $1",
            STUDENT_COLUMNS
        ))
        .bind(student_no)
        .fetch_optional(&self.db)
        .await?;

        Ok(student)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Student>, RepositoryError> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student ORDER BY id DESC",
            STUDENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(students)
    }

    #[instrument(skip(self, form), fields(student_no = %form.student_no))]
    async fn insert(&self, form: &StudentForm) -> Result<Student, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO student
                   (student_no, name, gender, age, major, class_name, phone, email,
                    enrollment_date, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {}"#,
            STUDENT_COLUMNS
        );
        debug!(params = 10, "Inserting student");

        sqlx::query_as::<_, Student>(&sql)
            .bind(&form.student_no)
            .bind(&form.name)
            .bind(form.gender)
            .bind(form.age)
            .bind(&form.major)
            .bind(&form.class_name)
            .bind(&form.phone)
            .bind(&form.email)
            .bind(form.enrollment_date)
            .bind(form.status_or_default())
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_write_error(e, &form.student_no))
    }

    #[instrument(skip(self, form), fields(student_no = %form.student_no))]
    async fn update(&self, id: i32, form: &StudentForm) -> Result<u64, RepositoryError> {
        debug!(params = 11, "Updating student");

        let result = sqlx::query(
            r#"UPDATE student
               SET student_no = $1, name = $2, gender = $3, age = $4, major = $5,
                   class_name = $6, phone = $7, email = $8, enrollment_date = $9,
                   status = $10
               WHERE id = $11"#,
        )
        .bind(&form.student_no)
        .bind(&form.name)
        .bind(form.gender)
        .bind(form.age)
        .bind(&form.major)
        .bind(&form.class_name)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(form.enrollment_date)
        .bind(form.status_or_default())
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| map_write_error(e, &form.student_no))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM student WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_batch(&self, ids: &[i32]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        debug!(params = ids.len(), "Deleting students in batch");

        let result = sqlx::query("DELETE FROM student WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM student").execute(&self.db).await?;
        Ok(result.rows_affected())
    }
}
