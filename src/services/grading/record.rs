use serde::Serialize;
use time::PrimitiveDateTime;

use super::scale::{percentage, GradeLetter, GradeScale};
use super::GradingError;
use crate::db::models::Grade;
use crate::db::types::GradeStanding;

/// Raw values a grader supplies for one (student, exam) pair.
#[derive(Debug, Clone)]
pub(crate) struct GradeEntry {
    pub(crate) marks_obtained: f64,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_by: String,
    pub(crate) standing: GradeStanding,
}

/// One student's score on one exam.
///
/// `percentage` and `letter` are derived once from the marks and the exam
/// total when the record is built and cannot be set on their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GradeRecord {
    student_id: String,
    exam_id: String,
    marks_obtained: f64,
    total_marks: f64,
    percentage: f64,
    letter: GradeLetter,
    feedback: Option<String>,
    graded_by: String,
    standing: GradeStanding,
    graded_at: PrimitiveDateTime,
}

impl GradeRecord {
    pub(crate) fn new(
        student_id: impl Into<String>,
        exam_id: impl Into<String>,
        total_marks: f64,
        entry: GradeEntry,
        graded_at: PrimitiveDateTime,
        scale: &GradeScale,
    ) -> Result<Self, GradingError> {
        let marks = entry.marks_obtained;
        if !marks.is_finite() {
            return Err(GradingError::Validation("Please enter marks".to_string()));
        }

        let percentage = percentage(marks, total_marks)?;
        if marks < 0.0 || marks > total_marks {
            return Err(GradingError::Validation(format!(
                "Marks must be between 0 and {total_marks}"
            )));
        }

        let letter = match entry.standing {
            GradeStanding::Graded => scale.letter_for(percentage),
            GradeStanding::Incomplete => GradeLetter::Incomplete,
            GradeStanding::Withdrawn => GradeLetter::Withdrawn,
        };

        let feedback =
            entry.feedback.map(|text| text.trim().to_string()).filter(|text| !text.is_empty());

        Ok(Self {
            student_id: student_id.into(),
            exam_id: exam_id.into(),
            marks_obtained: marks,
            total_marks,
            percentage,
            letter,
            feedback,
            graded_by: entry.graded_by,
            standing: entry.standing,
            graded_at,
        })
    }

    /// Rebuilds the record for a stored row; derived values are recomputed, never read back.
    pub(crate) fn restore(
        grade: &Grade,
        total_marks: f64,
        scale: &GradeScale,
    ) -> Result<Self, GradingError> {
        Self::new(
            grade.student_id.clone(),
            grade.exam_id.clone(),
            total_marks,
            GradeEntry {
                marks_obtained: grade.marks_obtained,
                feedback: grade.feedback.clone(),
                graded_by: grade.graded_by.clone(),
                standing: grade.standing,
            },
            grade.graded_at,
            scale,
        )
    }

    /// Replaces the grader-supplied values, keeping the (student, exam) pair and total.
    pub(crate) fn regrade(
        &self,
        entry: GradeEntry,
        graded_at: PrimitiveDateTime,
        scale: &GradeScale,
    ) -> Result<Self, GradingError> {
        Self::new(
            self.student_id.clone(),
            self.exam_id.clone(),
            self.total_marks,
            entry,
            graded_at,
            scale,
        )
    }

    pub(crate) fn student_id(&self) -> &str {
        &self.student_id
    }

    pub(crate) fn exam_id(&self) -> &str {
        &self.exam_id
    }

    pub(crate) fn marks_obtained(&self) -> f64 {
        self.marks_obtained
    }

    pub(crate) fn percentage(&self) -> f64 {
        self.percentage
    }

    pub(crate) fn letter(&self) -> GradeLetter {
        self.letter
    }

    pub(crate) fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub(crate) fn graded_by(&self) -> &str {
        &self.graded_by
    }

    pub(crate) fn standing(&self) -> GradeStanding {
        self.standing
    }

    pub(crate) fn graded_at(&self) -> PrimitiveDateTime {
        self.graded_at
    }
}
