//! OpenAPI document served at `/api-docs/openapi.json`.
//!
//! The envelope and page types in `roster-core` are generic and carry no
//! schema of their own, so the concrete shapes the endpoint returns are
//! spelled out here for documentation only.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::modules::students::model::StudentResponse;

/// `{code, message}` with no payload: writes, failures and the health probe.
#[derive(Serialize, ToSchema)]
pub struct MessageEnvelope {
    #[schema(example = 200)]
    pub code: u16,
    #[schema(example = "Student added successfully")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct StudentEnvelope {
    #[schema(example = 200)]
    pub code: u16,
    #[schema(example = "Query succeeded")]
    pub message: String,
    pub data: StudentResponse,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    #[schema(example = 1)]
    pub current_page: i64,
    #[schema(example = 10)]
    pub page_size: i64,
    #[schema(example = 25)]
    pub total_count: i64,
    #[schema(example = 3)]
    pub total_pages: i64,
    pub data: Vec<StudentResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentPageEnvelope {
    #[schema(example = 200)]
    pub code: u16,
    #[schema(example = "Query succeeded")]
    pub message: String,
    pub data: StudentPage,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::students::controller::student_endpoint,
    ),
    components(
        schemas(
            StudentResponse,
            StudentPage,
            MessageEnvelope,
            StudentEnvelope,
            StudentPageEnvelope,
        )
    ),
    tags(
        (name = "Students", description = "Student records, one endpoint selected by `action`"),
        (name = "Health", description = "Liveness probe")
    ),
    info(
        title = "Roster API",
        version = "0.1.0",
        description = "Student records management built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_student_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/student"));
        assert!(doc.paths.paths.contains_key("/health"));

        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("StudentResponse"));
        assert!(schemas.contains_key("StudentPageEnvelope"));
    }
}
