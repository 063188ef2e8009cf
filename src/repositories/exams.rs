use sqlx::PgPool;

use crate::db::models::Exam;
#[cfg(test)]
use crate::db::types::ExamType;

pub(crate) const COLUMNS: &str = "id, course_id, exam_name, exam_type, total_marks, created_at";

#[cfg(test)]
pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) exam_name: &'a str,
    pub(crate) exam_type: ExamType,
    pub(crate) total_marks: f64,
    pub(crate) created_at: time::PrimitiveDateTime,
}

#[cfg(test)]
pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, course_id, exam_name, exam_type, total_marks, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.exam_name)
    .bind(params.exam_type)
    .bind(params.total_marks)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams WHERE course_id = $1 ORDER BY created_at, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
