use sqlx::PgPool;

use crate::db::models::Grade;
use crate::db::types::GradeStanding;

const COLUMNS: &str = "\
    id, student_id, exam_id, marks_obtained, feedback, graded_by, standing, \
    graded_at, created_at";

pub(crate) struct UpsertGrade<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) marks_obtained: f64,
    pub(crate) feedback: Option<&'a str>,
    pub(crate) graded_by: &'a str,
    pub(crate) standing: GradeStanding,
    pub(crate) graded_at: time::PrimitiveDateTime,
}

/// Inserts the grade or overwrites the existing row for the same
/// (student, exam) pair. The original `id` and `created_at` survive a re-grade.
pub(crate) async fn upsert(pool: &PgPool, params: UpsertGrade<'_>) -> Result<Grade, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "INSERT INTO grades (
            id, student_id, exam_id, marks_obtained, feedback, graded_by, standing,
            graded_at, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$8)
         ON CONFLICT (student_id, exam_id)
         DO UPDATE SET marks_obtained = EXCLUDED.marks_obtained,
                       feedback = EXCLUDED.feedback,
                       graded_by = EXCLUDED.graded_by,
                       standing = EXCLUDED.standing,
                       graded_at = EXCLUDED.graded_at
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.exam_id)
    .bind(params.marks_obtained)
    .bind(params.feedback)
    .bind(params.graded_by)
    .bind(params.standing)
    .bind(params.graded_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_student_and_exam(
    pool: &PgPool,
    student_id: &str,
    exam_id: &str,
) -> Result<Option<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "SELECT {COLUMNS} FROM grades WHERE student_id = $1 AND exam_id = $2"
    ))
    .bind(student_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "SELECT {COLUMNS} FROM grades WHERE student_id = $1 ORDER BY graded_at DESC, id"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!(
        "SELECT {COLUMNS} FROM grades WHERE exam_id = $1 ORDER BY student_id"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}
