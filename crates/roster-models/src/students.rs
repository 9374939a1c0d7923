//! Student domain models and DTOs.
//!
//! [`Student`] is the stored row. [`StudentResponse`] is its wire shape with
//! the derived display texts. [`StudentForm`] carries the fields of an add or
//! update request and declares their validation rules. [`StudentFilter`] and
//! [`SortSpec`] describe a listing query.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use roster_core::serde::{serialize_optional_date, serialize_optional_datetime};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("email pattern is valid")
});

static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("mobile pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male = 1,
    Female = 2,
}

impl Gender {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Display text for a stored code. Anything other than 1 reads as female.
    pub fn text_for(code: i32) -> &'static str {
        if code == Self::Male.code() {
            Self::Male.text()
        } else {
            Self::Female.text()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentStatus {
    Active = 1,
    OnLeave = 2,
    Graduated = 3,
}

impl StudentStatus {
    pub const DEFAULT_CODE: i32 = 1;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Active),
            2 => Some(Self::OnLeave),
            3 => Some(Self::Graduated),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnLeave => "on leave",
            Self::Graduated => "graduated",
        }
    }

    pub fn text_for(code: i32) -> &'static str {
        Self::from_code(code).map_or("unknown", Self::text)
    }
}

/// A student row as stored in the `student` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i32,
    pub student_no: String,
    pub name: String,
    pub gender: i32,
    pub age: Option<i32>,
    pub major: Option<String>,
    pub class_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub create_time: NaiveDateTime,
    pub update_time: NaiveDateTime,
    pub status: i32,
}

impl Student {
    /// Builds a row from a validated form, as the storage layer would.
    pub fn from_form(id: i32, form: &StudentForm, now: NaiveDateTime) -> Self {
        Self {
            id,
            student_no: form.student_no.clone(),
            name: form.name.clone(),
            gender: form.gender.unwrap_or_default(),
            age: form.age,
            major: form.major.clone(),
            class_name: form.class_name.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
            enrollment_date: form.enrollment_date,
            create_time: now,
            update_time: now,
            status: form.status_or_default(),
        }
    }

    /// Overwrites every client-editable column from `form`.
    pub fn apply_form(&mut self, form: &StudentForm, now: NaiveDateTime) {
        self.student_no = form.student_no.clone();
        self.name = form.name.clone();
        self.gender = form.gender.unwrap_or_default();
        self.age = form.age;
        self.major = form.major.clone();
        self.class_name = form.class_name.clone();
        self.phone = form.phone.clone();
        self.email = form.email.clone();
        self.enrollment_date = form.enrollment_date;
        self.status = form.status_or_default();
        self.update_time = now;
    }

    pub fn gender_text(&self) -> &'static str {
        Gender::text_for(self.gender)
    }

    pub fn status_text(&self) -> &'static str {
        StudentStatus::text_for(self.status)
    }
}

/// A student as returned to clients. Absent optional fields are omitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: i32,
    #[schema(example = "S100")]
    pub student_no: String,
    pub name: String,
    pub gender: i32,
    #[schema(example = "male")]
    pub gender_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        serialize_with = "serialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2023-09-01")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(
        serialize_with = "serialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2023-09-01 08:00:00")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(
        serialize_with = "serialize_optional_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2023-09-01 08:00:00")]
    pub update_time: Option<NaiveDateTime>,
    pub status: i32,
    #[schema(example = "active")]
    pub status_text: String,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        let gender_text = student.gender_text().to_string();
        let status_text = student.status_text().to_string();
        Self {
            id: student.id,
            student_no: student.student_no,
            name: student.name,
            gender: student.gender,
            gender_text,
            age: student.age,
            major: student.major,
            class_name: student.class_name,
            phone: student.phone,
            email: student.email,
            enrollment_date: student.enrollment_date,
            create_time: Some(student.create_time),
            update_time: Some(student.update_time),
            status: student.status,
            status_text,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn loose_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(value) {
        return Ok(());
    }
    Err(ValidationError::new("email").with_message(Cow::Borrowed("Email format is invalid")))
}

/// True when `phone` looks like a mainland mobile number. Only advisory.
pub fn is_mobile_number(phone: &str) -> bool {
    MOBILE_PATTERN.is_match(phone)
}

/// The editable fields of a student, as submitted for add or update.
///
/// Text fields are expected to be trimmed, with blank optional values
/// already collapsed to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct StudentForm {
    pub id: Option<i32>,
    #[validate(
        custom(function = "not_blank", message = "Student number is required"),
        length(
            max = 20,
            message = "Student number must be at most 20 characters"
        )
    )]
    pub student_no: String,
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    pub name: String,
    #[validate(
        required(message = "Gender is required"),
        range(min = 1, max = 2, message = "Gender must be 1 (male) or 2 (female)")
    )]
    pub gender: Option<i32>,
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,
    #[validate(length(max = 100, message = "Major must be at most 100 characters"))]
    pub major: Option<String>,
    #[validate(length(max = 50, message = "Class name must be at most 50 characters"))]
    pub class_name: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(
        length(max = 100, message = "Email must be at most 100 characters"),
        custom(function = "loose_email", message = "Email format is invalid")
    )]
    pub email: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    #[validate(range(
        min = 1,
        max = 3,
        message = "Status must be 1 (active), 2 (on leave) or 3 (graduated)"
    ))]
    pub status: Option<i32>,
}

impl StudentForm {
    /// Field names in the order their rules are checked.
    pub const FIELD_ORDER: [&'static str; 9] = [
        "student_no",
        "name",
        "gender",
        "age",
        "major",
        "class_name",
        "phone",
        "email",
        "status",
    ];

    pub fn status_or_default(&self) -> i32 {
        self.status.unwrap_or(StudentStatus::DEFAULT_CODE)
    }
}

/// Optional listing filters. `None` means the filter was not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub student_no: Option<String>,
    pub name: Option<String>,
    pub gender: Option<i32>,
    pub major: Option<String>,
    pub class_name: Option<String>,
    pub status: Option<i32>,
}

/// Columns a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    StudentNo,
    Name,
    Gender,
    Age,
    Major,
    ClassName,
    Phone,
    Email,
    EnrollmentDate,
    CreateTime,
    UpdateTime,
    Status,
}

impl SortColumn {
    /// Accepts the camelCase request spelling or the snake_case column name.
    pub fn parse(s: &str) -> Option<Self> {
        let column = match s.trim() {
            "id" => Self::Id,
            "studentNo" | "student_no" => Self::StudentNo,
            "name" => Self::Name,
            "gender" => Self::Gender,
            "age" => Self::Age,
            "major" => Self::Major,
            "className" | "class_name" => Self::ClassName,
            "phone" => Self::Phone,
            "email" => Self::Email,
            "enrollmentDate" | "enrollment_date" => Self::EnrollmentDate,
            "createTime" | "create_time" => Self::CreateTime,
            "updateTime" | "update_time" => Self::UpdateTime,
            "status" => Self::Status,
            _ => return None,
        };
        Some(column)
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::StudentNo => "student_no",
            Self::Name => "name",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Major => "major",
            Self::ClassName => "class_name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::EnrollmentDate => "enrollment_date",
            Self::CreateTime => "create_time",
            Self::UpdateTime => "update_time",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case sorts descending; any other token sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering for a listing. Defaults to newest id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: SortColumn::Id,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Resolves raw `orderBy`/`orderType` values. A blank or unknown column
    /// falls back to `id`; a blank direction falls back to descending.
    pub fn from_params(order_by: Option<&str>, order_type: Option<&str>) -> Self {
        let defaults = Self::default();
        let column = order_by
            .and_then(SortColumn::parse)
            .unwrap_or(defaults.column);
        let direction = order_type
            .filter(|s| !s.trim().is_empty())
            .map_or(defaults.direction, SortDirection::parse);
        Self { column, direction }
    }

    pub fn to_sql(self) -> String {
        format!("{} {}", self.column.as_sql(), self.direction.as_sql())
    }
}
