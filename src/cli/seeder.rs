use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use roster_models::{StudentForm, StudentStatus};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

const MAJORS: [&str; 6] = [
    "Computer Science",
    "Mathematics",
    "Physics",
    "Economics",
    "Literature",
    "Mechanical Engineering",
];

/// 10 parameters per row keeps a chunk well under PostgreSQL's bind limit.
const BATCH_SIZE: usize = 1000;
const COLUMNS: usize = 10;

/// `S` followed by the sequence number, zero-padded to six digits.
pub fn student_number(sequence: i64) -> String {
    format!("S{:06}", sequence)
}

fn fake_student(sequence: i64) -> StudentForm {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let major = MAJORS[(0..MAJORS.len()).fake::<usize>()];
    let year: i32 = (2019..2025).fake();

    StudentForm {
        id: None,
        student_no: student_number(sequence),
        name: format!("{} {}", first_name, last_name).chars().take(50).collect(),
        gender: Some((1..=2).fake()),
        age: Some((17..=26).fake()),
        major: Some(major.to_string()),
        class_name: Some(format!("{}-{}", year, (1..=4).fake::<i32>())),
        phone: Some(format!(
            "1{}{:09}",
            (3..=9).fake::<u8>(),
            (0..1_000_000_000u32).fake::<u32>()
        )),
        email: Some(SafeEmail().fake()),
        enrollment_date: NaiveDate::from_ymd_opt(year, 9, 1),
        status: Some(if year < 2021 {
            StudentStatus::Graduated.code()
        } else {
            StudentStatus::Active.code()
        }),
    }
}

/// Generates `count` students numbered from `first_sequence`, in parallel.
pub fn generate_students(first_sequence: i64, count: usize) -> Vec<StudentForm> {
    (0..count)
        .into_par_iter()
        .map(|offset| fake_student(first_sequence + offset as i64))
        .collect()
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentForm],
) -> Result<u64, sqlx::Error> {
    if students.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO student (student_no, name, gender, age, major, class_name, phone, email, enrollment_date, status) VALUES ",
    );
    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let placeholders: Vec<String> = (1..=COLUMNS)
            .map(|n| format!("${}", i * COLUMNS + n))
            .collect();
        query.push_str(&format!("({})", placeholders.join(", ")));
    }
    query.push_str(" ON CONFLICT (student_no) DO NOTHING");

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(&student.student_no)
            .bind(&student.name)
            .bind(student.gender)
            .bind(student.age)
            .bind(&student.major)
            .bind(&student.class_name)
            .bind(&student.phone)
            .bind(&student.email)
            .bind(student.enrollment_date)
            .bind(student.status_or_default());
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

/// Inserts `count` fake students in one transaction, numbering them after
/// the current highest id. Numbers that already exist are skipped. Returns
/// how many rows were inserted.
pub async fn seed_students(db: &PgPool, count: usize) -> anyhow::Result<u64> {
    let start = Instant::now();

    let max_id: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM student")
        .fetch_one(db)
        .await
        .context("Failed to read current maximum student id")?;

    let students = generate_students(i64::from(max_id) + 1, count);
    info!(count = students.len(), elapsed = ?start.elapsed(), "Generated fake students");

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in students.chunks(BATCH_SIZE) {
        inserted += insert_students_chunk(&mut tx, chunk)
            .await
            .context("Failed to insert students")?;
    }
    tx.commit().await?;

    info!(inserted, elapsed = ?start.elapsed(), "Seeding complete");
    Ok(inserted)
}
