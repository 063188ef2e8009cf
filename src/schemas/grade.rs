use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, Exam};
use crate::db::types::{ExamType, GradeStanding};
use crate::services::grading::{
    GradeLetter, GradeStatus, GradeSummary, GradeView, RosterEntry, Scored,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseQuery {
    #[serde(default)]
    pub(crate) course_id: Option<String>,
}

/// Marks are optional on the wire so a missing value can be reported as
/// "Please enter marks" instead of a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeUpsertRequest {
    #[serde(default, alias = "marksObtained")]
    pub(crate) marks_obtained: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Feedback must be at most 2000 characters"))]
    pub(crate) feedback: Option<String>,
    #[serde(default)]
    pub(crate) standing: Option<GradeStanding>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeRowResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) exam_name: String,
    pub(crate) course_id: Option<String>,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) marks_obtained: f64,
    pub(crate) total_marks: Option<f64>,
    pub(crate) percentage: Option<f64>,
    pub(crate) grade: Option<GradeLetter>,
    pub(crate) standing: GradeStanding,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_by: String,
    pub(crate) graded_at: String,
}

impl GradeRowResponse {
    pub(crate) fn from_view(view: &GradeView) -> Self {
        Self {
            id: view.grade.id.clone(),
            student_id: view.grade.student_id.clone(),
            exam_id: view.grade.exam_id.clone(),
            exam_name: view.exam_name().to_string(),
            course_id: view.course_id().map(str::to_string),
            course_code: view.course_code().to_string(),
            course_name: view.course_name().to_string(),
            marks_obtained: view.grade.marks_obtained,
            total_marks: view.exam.as_ref().map(|exam| exam.total_marks),
            percentage: view.percentage(),
            grade: view.letter(),
            standing: view.grade.standing,
            feedback: view.grade.feedback.clone(),
            graded_by: view.grade.graded_by.clone(),
            graded_at: format_primitive(view.grade.graded_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentGradesResponse {
    pub(crate) student_id: String,
    pub(crate) course_id: Option<String>,
    pub(crate) grades: Vec<GradeRowResponse>,
    /// Only present when a single course is selected.
    pub(crate) course_summary: Option<GradeSummary>,
    pub(crate) overall_summary: GradeSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) faculty_id: Option<String>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            course_code: course.course_code,
            course_name: course.course_name,
            faculty_id: course.faculty_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) exam_name: String,
    pub(crate) exam_type: ExamType,
    pub(crate) total_marks: f64,
}

impl From<Exam> for ExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            course_id: exam.course_id,
            exam_name: exam.exam_name,
            exam_type: exam.exam_type,
            total_marks: exam.total_marks,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterRowResponse {
    pub(crate) student_id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) status: GradeStatus,
}

impl From<RosterEntry> for RosterRowResponse {
    fn from(entry: RosterEntry) -> Self {
        Self {
            student_id: entry.student.id,
            username: entry.student.username,
            full_name: entry.student.full_name,
            status: entry.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterResponse {
    pub(crate) exam_id: String,
    pub(crate) graded: usize,
    pub(crate) not_graded: usize,
    pub(crate) students: Vec<RosterRowResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamGradesResponse {
    pub(crate) exam_id: String,
    pub(crate) grades: Vec<GradeRowResponse>,
    pub(crate) summary: GradeSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecordGradeResponse {
    pub(crate) created: bool,
    pub(crate) grade: GradeRowResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_request_accepts_missing_marks() {
        let request: GradeUpsertRequest = serde_json::from_str(r#"{"feedback":"ok"}"#).unwrap();
        assert!(request.marks_obtained.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn grade_request_rejects_oversized_feedback() {
        let request = GradeUpsertRequest {
            marks_obtained: Some(10.0),
            feedback: Some("x".repeat(2001)),
            standing: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn grade_request_reads_camel_case_marks_and_standing() {
        let request: GradeUpsertRequest =
            serde_json::from_str(r#"{"marksObtained":42.5,"standing":"incomplete"}"#).unwrap();
        assert_eq!(request.marks_obtained, Some(42.5));
        assert_eq!(request.standing, Some(GradeStanding::Incomplete));
    }
}
