use async_trait::async_trait;
use sqlx::PgPool;

use super::record::GradeRecord;
use super::store::{Catalog, GradeStore, SavedGrade};
use super::GradingError;
use crate::db::models::{Course, Exam, Grade, StudentSummary};
use crate::repositories::{courses, enrollments, exams, grades};

/// Postgres-backed grade store and catalog.
#[derive(Clone)]
pub(crate) struct PgGradebook {
    pool: PgPool,
}

impl PgGradebook {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradeStore for PgGradebook {
    async fn find_grade(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<Option<Grade>, GradingError> {
        Ok(grades::find_by_student_and_exam(&self.pool, student_id, exam_id).await?)
    }

    async fn save_grade(&self, record: &GradeRecord) -> Result<SavedGrade, GradingError> {
        let id = uuid::Uuid::new_v4().to_string();
        let grade = grades::upsert(
            &self.pool,
            grades::UpsertGrade {
                id: &id,
                student_id: record.student_id(),
                exam_id: record.exam_id(),
                marks_obtained: record.marks_obtained(),
                feedback: record.feedback(),
                graded_by: record.graded_by(),
                standing: record.standing(),
                graded_at: record.graded_at(),
            },
        )
        .await?;
        // A re-grade keeps the stored id, so only a fresh insert returns ours.
        let created = grade.id == id;
        Ok(SavedGrade { grade, created })
    }

    async fn grades_by_student(&self, student_id: &str) -> Result<Vec<Grade>, GradingError> {
        Ok(grades::list_by_student(&self.pool, student_id).await?)
    }

    async fn grades_by_exam(&self, exam_id: &str) -> Result<Vec<Grade>, GradingError> {
        Ok(grades::list_by_exam(&self.pool, exam_id).await?)
    }
}

#[async_trait]
impl Catalog for PgGradebook {
    async fn exam(&self, exam_id: &str) -> Result<Option<Exam>, GradingError> {
        Ok(exams::find_by_id(&self.pool, exam_id).await?)
    }

    async fn course(&self, course_id: &str) -> Result<Option<Course>, GradingError> {
        Ok(courses::find_by_id(&self.pool, course_id).await?)
    }

    async fn courses_by_faculty(&self, faculty_id: &str) -> Result<Vec<Course>, GradingError> {
        Ok(courses::list_by_faculty(&self.pool, faculty_id).await?)
    }

    async fn exams_by_course(&self, course_id: &str) -> Result<Vec<Exam>, GradingError> {
        Ok(exams::list_by_course(&self.pool, course_id).await?)
    }

    async fn all_courses(&self) -> Result<Vec<Course>, GradingError> {
        Ok(courses::list_all(&self.pool).await?)
    }

    async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, GradingError> {
        Ok(courses::list_for_student(&self.pool, student_id).await?)
    }

    async fn enrolled_students(
        &self,
        course_id: &str,
    ) -> Result<Vec<StudentSummary>, GradingError> {
        Ok(enrollments::list_students(&self.pool, course_id).await?)
    }

    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> Result<bool, GradingError> {
        Ok(enrollments::is_enrolled(&self.pool, course_id, student_id).await?)
    }
}
