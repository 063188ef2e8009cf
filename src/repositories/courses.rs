use sqlx::PgPool;

use crate::db::models::Course;

const COLUMNS: &str = "id, course_code, course_name, faculty_id, created_at";

// Courses are provisioned outside the service; only fixtures insert them.
#[cfg(test)]
pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_code: &'a str,
    pub(crate) course_name: &'a str,
    pub(crate) faculty_id: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

#[cfg(test)]
pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, course_code, course_name, faculty_id, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_code)
    .bind(params.course_name)
    .bind(params.faculty_id)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses ORDER BY course_code, id"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_by_faculty(
    pool: &PgPool,
    faculty_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses WHERE faculty_id = $1 ORDER BY course_code, id"
    ))
    .bind(faculty_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.course_code, c.course_name, c.faculty_id, c.created_at
         FROM courses c
         JOIN course_enrollments ce ON ce.course_id = c.id
         WHERE ce.student_id = $1
         ORDER BY c.course_code, c.id",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
