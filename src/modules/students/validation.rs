//! Fail-fast checks for student writes.
//!
//! The rules themselves are declared on [`StudentForm`]. This module runs
//! them, picks the first violation in field order, and applies the extra
//! checks that depend on whether the form is an add or an update.

use anyhow::anyhow;
use roster_core::AppError;
use roster_models::{StudentForm, is_mobile_number};
use tracing::warn;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Update,
}

/// Presence beats size, and size beats format, within one field.
fn rank(error: &ValidationError) -> u8 {
    match error.code.as_ref() {
        "required" => 0,
        "length" | "range" => 1,
        _ => 2,
    }
}

fn message_for(field: &str, error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| format!("{} is invalid", field))
}

/// The first violation in [`StudentForm::FIELD_ORDER`], as
/// `(field position, message)`.
fn first_violation(errors: &ValidationErrors) -> Option<(usize, String)> {
    let field_errors = errors.field_errors();
    StudentForm::FIELD_ORDER
        .iter()
        .enumerate()
        .find_map(|(position, field)| {
            let error = field_errors.get(*field)?.iter().min_by_key(|e| rank(e))?;
            Some((position, message_for(field, error)))
        })
}

fn phone_position() -> usize {
    StudentForm::FIELD_ORDER
        .iter()
        .position(|f| *f == "phone")
        .unwrap_or(usize::MAX)
}

/// Validates `form`, returning the first violation as a 400.
///
/// A phone number that does not look like a mobile number is logged and
/// accepted.
pub fn validate_student(form: &StudentForm, mode: FormMode) -> Result<(), AppError> {
    if mode == FormMode::Update && !form.id.is_some_and(|id| id > 0) {
        return Err(AppError::bad_request(anyhow!("Student id is required")));
    }

    let violation = form.validate().err().and_then(|e| first_violation(&e));

    let reached_phone = violation
        .as_ref()
        .is_none_or(|(position, _)| *position > phone_position());
    if reached_phone
        && let Some(phone) = &form.phone
        && !is_mobile_number(phone)
    {
        warn!(phone = %phone, "Phone number may be malformed");
    }

    match violation {
        Some((_, message)) => Err(AppError::bad_request(anyhow!(message))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn valid_form() -> StudentForm {
        StudentForm {
            student_no: "S100".to_string(),
            name: "Li".to_string(),
            gender: Some(1),
            status: Some(1),
            ..Default::default()
        }
    }

    fn message(form: &StudentForm) -> String {
        validate_student(form, FormMode::Add).unwrap_err().message()
    }

    #[test]
    fn test_valid_form_passes_in_both_modes() {
        assert!(validate_student(&valid_form(), FormMode::Add).is_ok());
        let form = StudentForm {
            id: Some(3),
            ..valid_form()
        };
        assert!(validate_student(&form, FormMode::Update).is_ok());
    }

    #[test]
    fn test_update_requires_positive_id() {
        for id in [None, Some(0), Some(-4)] {
            let form = StudentForm { id, ..valid_form() };
            let err = validate_student(&form, FormMode::Update).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message(), "Student id is required");
        }
    }

    #[test]
    fn test_first_violation_wins() {
        let form = StudentForm {
            student_no: String::new(),
            name: String::new(),
            gender: None,
            ..valid_form()
        };
        assert_eq!(message(&form), "Student number is required");

        let form = StudentForm {
            name: "x".repeat(51),
            age: Some(0),
            ..valid_form()
        };
        assert_eq!(message(&form), "Name must be at most 50 characters");
    }

    #[test]
    fn test_field_messages() {
        let cases = [
            (
                StudentForm {
                    student_no: "S".repeat(21),
                    ..valid_form()
                },
                "Student number must be at most 20 characters",
            ),
            (
                StudentForm {
                    gender: None,
                    ..valid_form()
                },
                "Gender is required",
            ),
            (
                StudentForm {
                    gender: Some(3),
                    ..valid_form()
                },
                "Gender must be 1 (male) or 2 (female)",
            ),
            (
                StudentForm {
                    age: Some(151),
                    ..valid_form()
                },
                "Age must be between 1 and 150",
            ),
            (
                StudentForm {
                    class_name: Some("c".repeat(51)),
                    ..valid_form()
                },
                "Class name must be at most 50 characters",
            ),
            (
                StudentForm {
                    email: Some("abc".to_string()),
                    ..valid_form()
                },
                "Email format is invalid",
            ),
            (
                StudentForm {
                    status: Some(4),
                    ..valid_form()
                },
                "Status must be 1 (active), 2 (on leave) or 3 (graduated)",
            ),
        ];

        for (form, expected) in cases {
            assert_eq!(message(&form), expected);
        }
    }

    #[test]
    fn test_email_length_checked_before_format() {
        let form = StudentForm {
            email: Some(format!("{}@", "a".repeat(100))),
            ..valid_form()
        };
        assert_eq!(message(&form), "Email must be at most 100 characters");
    }

    #[test]
    fn test_loose_email_accepted() {
        let form = StudentForm {
            email: Some("a@b".to_string()),
            ..valid_form()
        };
        assert!(validate_student(&form, FormMode::Add).is_ok());
    }

    #[test]
    fn test_odd_phone_is_only_advisory() {
        let form = StudentForm {
            phone: Some("010-12345678".to_string()),
            ..valid_form()
        };
        assert!(validate_student(&form, FormMode::Add).is_ok());

        let form = StudentForm {
            phone: Some("1".repeat(21)),
            ..valid_form()
        };
        assert_eq!(message(&form), "Phone must be at most 20 characters");
    }
}
