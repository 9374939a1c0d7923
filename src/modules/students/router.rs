use crate::modules::students::controller::student_endpoint;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_students_router() -> Router<AppState> {
    Router::new().route("/student", get(student_endpoint).post(student_endpoint))
}
