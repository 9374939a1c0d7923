use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use async_trait::async_trait;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use roster::modules::students::{
    MemoryStudentRepository, RepositoryError, SortSpec, Student, StudentFilter, StudentForm,
    StudentRepository,
};
use roster::router::init_router;
use roster::state::AppState;
use roster_config::AppConfig;
use serde_json::Value;
use tower::ServiceExt;

/// Configuration built from defaults only, independent of the environment.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None)
}

pub fn setup_test_app() -> Router {
    setup_test_app_with(Arc::new(MemoryStudentRepository::new()))
}

pub fn setup_test_app_with(students: Arc<dyn StudentRepository>) -> Router {
    init_router(AppState::new(students, test_config()))
}

/// Sends `request` and returns the status with the parsed JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(app: &Router, query: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(format!("/student?{}", query))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POSTs an urlencoded form to `/student`.
pub async fn post_form(app: &Router, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/student")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

/// Adds a minimal valid student and returns its assigned id.
#[allow(dead_code)]
pub async fn add_student(app: &Router, student_no: &str, name: &str) -> i64 {
    let (status, body) = post_form(
        app,
        &format!("action=add&studentNo={}&name={}&gender=1", student_no, name),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, page) = get(app, &format!("action=query&studentNo={}", student_no)).await;
    page["data"]["data"][0]["id"].as_i64().unwrap()
}

/// A store whose every call fails as if the connection pool were exhausted.
/// With `lookups_succeed`, the student-number lookup finds nothing instead, so
/// writes reach the store.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingStudentRepository {
    pub lookups_succeed: bool,
}

fn pool_timeout() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl StudentRepository for FailingStudentRepository {
    async fn count(&self, _filter: &StudentFilter) -> Result<i64, RepositoryError> {
        Err(pool_timeout())
    }

    async fn find_page(
        &self,
        _filter: &StudentFilter,
        _sort: SortSpec,
        _offset: i64,
        _limit: i64,
    ) -> Result<Vec<Student>, RepositoryError> {
        Err(pool_timeout())
    }

    async fn find_by_id(&self, _id: i32) -> Result<Option<Student>, RepositoryError> {
        Err(pool_timeout())
    }

    async fn find_by_student_no(
        &self,
        _student_no: &str,
    ) -> Result<Option<Student>, RepositoryError> {
        if self.lookups_succeed {
            Ok(None)
        } else {
            Err(pool_timeout())
        }
    }

    async fn find_all(&self) -> Result<Vec<Student>, RepositoryError> {
        Err(pool_timeout())
    }

    async fn insert(&self, _form: &StudentForm) -> Result<Student, RepositoryError> {
        Err(pool_timeout())
    }

    async fn update(&self, _id: i32, _form: &StudentForm) -> Result<u64, RepositoryError> {
        Err(pool_timeout())
    }

    async fn delete_by_id(&self, _id: i32) -> Result<u64, RepositoryError> {
        Err(pool_timeout())
    }

    async fn delete_batch(&self, _ids: &[i32]) -> Result<u64, RepositoryError> {
        Err(pool_timeout())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        Err(pool_timeout())
    }
}
