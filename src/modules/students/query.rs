//! Listing predicates.
//!
//! A [`StudentFilter`] becomes a list of [`Predicate`]s. The PostgreSQL
//! repository renders them into a `WHERE` fragment with positional
//! placeholders; the in-memory repository evaluates them directly. User
//! values only ever travel as bind parameters.

use roster_core::text::like_pattern;
use roster_models::{Student, StudentFilter};

/// Filterable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StudentNo,
    Name,
    Gender,
    Major,
    ClassName,
    Status,
}

impl Column {
    pub fn as_sql(self) -> &'static str {
        match self {
            Column::StudentNo => "student_no",
            Column::Name => "name",
            Column::Gender => "gender",
            Column::Major => "major",
            Column::ClassName => "class_name",
            Column::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(Column, Value),
    /// Case-insensitive match against a pattern already wrapped in `%`
    /// wildcards.
    Like(Column, String),
}

impl Predicate {
    /// Whether `student` satisfies this predicate. `Like` is evaluated as a
    /// case-folded substring match on the unwrapped pattern.
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            Predicate::Equals(column, Value::Int(expected)) => match column {
                Column::Gender => student.gender == *expected,
                Column::Status => student.status == *expected,
                _ => false,
            },
            Predicate::Equals(column, Value::Text(expected)) => {
                text_column(student, *column) == Some(expected.as_str())
            }
            Predicate::Like(column, pattern) => {
                let needle = pattern
                    .trim_start_matches('%')
                    .trim_end_matches('%')
                    .to_lowercase();
                text_column(student, *column)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            }
        }
    }
}

fn text_column(student: &Student, column: Column) -> Option<&str> {
    match column {
        Column::StudentNo => Some(student.student_no.as_str()),
        Column::Name => Some(student.name.as_str()),
        Column::Major => student.major.as_deref(),
        Column::ClassName => student.class_name.as_deref(),
        Column::Gender | Column::Status => None,
    }
}

/// Translates a filter into predicates, in a fixed column order. Absent
/// filters contribute nothing.
pub fn predicates(filter: &StudentFilter) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(student_no) = &filter.student_no {
        predicates.push(Predicate::Equals(
            Column::StudentNo,
            Value::Text(student_no.clone()),
        ));
    }
    if let Some(name) = &filter.name {
        predicates.push(Predicate::Like(Column::Name, like_pattern(name)));
    }
    if let Some(gender) = filter.gender {
        predicates.push(Predicate::Equals(Column::Gender, Value::Int(gender)));
    }
    if let Some(major) = &filter.major {
        predicates.push(Predicate::Like(Column::Major, like_pattern(major)));
    }
    if let Some(class_name) = &filter.class_name {
        predicates.push(Predicate::Like(Column::ClassName, like_pattern(class_name)));
    }
    if let Some(status) = filter.status {
        predicates.push(Predicate::Equals(Column::Status, Value::Int(status)));
    }

    predicates
}

/// A rendered `WHERE` tail and the values for its placeholders, in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Renders predicates as `" AND col = $n"` or `" AND col ILIKE $n"` fragments,
/// numbering placeholders from `start`. The result is meant to follow
/// `WHERE 1=1`.
pub fn render(predicates: &[Predicate], start: usize) -> WhereClause {
    let mut clause = WhereClause::default();

    for (i, predicate) in predicates.iter().enumerate() {
        let n = start + i;
        match predicate {
            Predicate::Equals(column, value) => {
                clause
                    .sql
                    .push_str(&format!(" AND {} = ${}", column.as_sql(), n));
                clause.binds.push(value.clone());
            }
            Predicate::Like(column, pattern) => {
                clause
                    .sql
                    .push_str(&format!(" AND {} ILIKE ${}", column.as_sql(), n));
                clause.binds.push(Value::Text(pattern.clone()));
            }
        }
    }

    clause
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use roster_models::StudentForm;

    fn student(name: &str, class_name: Option<&str>, gender: i32) -> Student {
        let form = StudentForm {
            student_no: "S1".to_string(),
            name: name.to_string(),
            gender: Some(gender),
            class_name: class_name.map(str::to_string),
            ..Default::default()
        };
        let now = NaiveDate::from_ymd_opt(2024, 9, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Student::from_form(1, &form, now)
    }

    #[test]
    fn test_empty_filter_renders_nothing() {
        let clause = render(&predicates(&StudentFilter::default()), 1);
        assert_eq!(clause, WhereClause::default());
    }

    #[test]
    fn test_every_present_filter_appears_once() {
        let filter = StudentFilter {
            student_no: Some("S100".to_string()),
            name: Some(" Li ".to_string()),
            gender: Some(1),
            major: Some("Math".to_string()),
            class_name: Some("C1".to_string()),
            status: Some(2),
        };
        let clause = render(&predicates(&filter), 1);
        assert_eq!(
            clause.sql,
            " AND student_no = $1 AND name ILIKE $2 AND gender = $3 \
             AND major ILIKE $4 AND class_name ILIKE $5 AND status = $6"
        );
        assert_eq!(
            clause.binds,
            vec![
                Value::Text("S100".to_string()),
                Value::Text("%Li%".to_string()),
                Value::Int(1),
                Value::Text("%Math%".to_string()),
                Value::Text("%C1%".to_string()),
                Value::Int(2),
            ]
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let filter = StudentFilter {
            name: Some("x' OR '1'='1".to_string()),
            ..Default::default()
        };
        let clause = render(&predicates(&filter), 3);
        assert_eq!(clause.sql, " AND name ILIKE $3");
        assert!(!clause.sql.contains("OR"));
    }

    #[test]
    fn test_matches_like_and_equals() {
        let li = student("Li Lei", Some("Class 2"), 1);
        assert!(Predicate::Like(Column::Name, "%Lei%".to_string()).matches(&li));
        assert!(Predicate::Like(Column::Name, "%lei%".to_string()).matches(&li));
        assert!(Predicate::Like(Column::Name, "%LI L%".to_string()).matches(&li));
        assert!(!Predicate::Like(Column::Name, "%Lu%".to_string()).matches(&li));
        assert!(Predicate::Like(Column::ClassName, "%2%".to_string()).matches(&li));
        assert!(!Predicate::Like(Column::Major, "%%".to_string()).matches(&li));
        assert!(Predicate::Equals(Column::Gender, Value::Int(1)).matches(&li));
        assert!(!Predicate::Equals(Column::Status, Value::Int(3)).matches(&li));
        assert!(
            Predicate::Equals(Column::StudentNo, Value::Text("S1".to_string())).matches(&li)
        );
    }
}
