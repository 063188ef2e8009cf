use async_trait::async_trait;

use super::record::GradeRecord;
use super::GradingError;
use crate::db::models::{Course, Exam, Grade, StudentSummary};

/// Outcome of an upsert. `created` is decided by the write itself, so two
/// racing first entries cannot both claim to have created the row.
#[derive(Debug, Clone)]
pub(crate) struct SavedGrade {
    pub(crate) grade: Grade,
    pub(crate) created: bool,
}

/// Grade persistence.
///
/// `save_grade` must be an atomic upsert keyed by (student_id, exam_id):
/// at most one stored grade per pair, whatever the write concurrency.
#[async_trait]
pub(crate) trait GradeStore: Send + Sync {
    async fn find_grade(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<Option<Grade>, GradingError>;

    async fn save_grade(&self, record: &GradeRecord) -> Result<SavedGrade, GradingError>;

    async fn grades_by_student(&self, student_id: &str) -> Result<Vec<Grade>, GradingError>;

    async fn grades_by_exam(&self, exam_id: &str) -> Result<Vec<Grade>, GradingError>;
}

/// Read-only view of courses, exams and enrolment.
#[async_trait]
pub(crate) trait Catalog: Send + Sync {
    async fn exam(&self, exam_id: &str) -> Result<Option<Exam>, GradingError>;

    async fn course(&self, course_id: &str) -> Result<Option<Course>, GradingError>;

    async fn courses_by_faculty(&self, faculty_id: &str) -> Result<Vec<Course>, GradingError>;

    async fn exams_by_course(&self, course_id: &str) -> Result<Vec<Exam>, GradingError>;

    async fn all_courses(&self) -> Result<Vec<Course>, GradingError>;

    async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, GradingError>;

    async fn enrolled_students(
        &self,
        course_id: &str,
    ) -> Result<Vec<StudentSummary>, GradingError>;

    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> Result<bool, GradingError>;
}
