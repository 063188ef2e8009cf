use sqlx::PgPool;

use crate::db::models::StudentSummary;

#[cfg(test)]
pub(crate) async fn enroll(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_enrollments (course_id, student_id, enrolled_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (course_id, student_id) DO NOTHING",
    )
    .bind(course_id)
    .bind(student_id)
    .bind(enrolled_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn is_enrolled(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
            SELECT 1 FROM course_enrollments WHERE course_id = $1 AND student_id = $2
         )",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_students(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<StudentSummary>, sqlx::Error> {
    sqlx::query_as::<_, StudentSummary>(
        "SELECT u.id, u.username, u.full_name
         FROM course_enrollments ce
         JOIN users u ON u.id = ce.student_id
         WHERE ce.course_id = $1
         ORDER BY u.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
