use std::collections::HashMap;

use serde::Serialize;

use super::policy::{can_manage_course, can_read, can_write, course_scope, Actor, CourseScope};
use super::record::{GradeEntry, GradeRecord};
use super::scale::GradeLetter;
use super::stats::Scored;
use super::store::{Catalog, GradeStore, SavedGrade};
use super::GradingError;
use crate::core::config::GradingSettings;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Course, Exam, Grade, StudentSummary};
use crate::db::types::{GradeStanding, UserRole};

const UNKNOWN_COURSE_CODE: &str = "Unknown";
const UNKNOWN_COURSE_NAME: &str = "Unknown Course";
const UNKNOWN_EXAM_NAME: &str = "Unknown Exam";

/// A stored grade with its exam and course attached for display.
///
/// `record` is `None` when the exam could not be resolved or the stored
/// marks no longer fit its total; such rows still display, they just do
/// not count towards statistics.
#[derive(Debug, Clone)]
pub(crate) struct GradeView {
    pub(crate) grade: Grade,
    pub(crate) exam: Option<Exam>,
    pub(crate) course: Option<Course>,
    pub(crate) record: Option<GradeRecord>,
}

impl GradeView {
    pub(crate) fn course_id(&self) -> Option<&str> {
        self.exam.as_ref().map(|exam| exam.course_id.as_str())
    }

    pub(crate) fn course_code(&self) -> &str {
        self.course.as_ref().map_or(UNKNOWN_COURSE_CODE, |course| course.course_code.as_str())
    }

    pub(crate) fn course_name(&self) -> &str {
        self.course.as_ref().map_or(UNKNOWN_COURSE_NAME, |course| course.course_name.as_str())
    }

    pub(crate) fn exam_name(&self) -> &str {
        self.exam.as_ref().map_or(UNKNOWN_EXAM_NAME, |exam| exam.exam_name.as_str())
    }
}

impl Scored for GradeView {
    fn percentage(&self) -> Option<f64> {
        self.record.as_ref().map(GradeRecord::percentage)
    }

    fn letter(&self) -> Option<GradeLetter> {
        self.record.as_ref().map(GradeRecord::letter)
    }
}

/// Course selector value; `All` passes everything through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CourseFilter {
    All,
    Course(String),
}

impl CourseFilter {
    pub(crate) fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") | Some("ALL") | Some("-1") => Self::All,
            Some(course_id) => Self::Course(course_id.to_string()),
        }
    }
}

/// Stable, order-preserving course filter over hydrated grades.
pub(crate) fn filter_by_course(views: Vec<GradeView>, filter: &CourseFilter) -> Vec<GradeView> {
    match filter {
        CourseFilter::All => views,
        CourseFilter::Course(course_id) => {
            views.into_iter().filter(|view| view.course_id() == Some(course_id.as_str())).collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum GradeStatus {
    Graded,
    NotGraded,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RosterEntry {
    pub(crate) student: StudentSummary,
    pub(crate) status: GradeStatus,
}

#[derive(Debug, Clone)]
pub(crate) struct GradeSubmission {
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) marks_obtained: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) standing: GradeStanding,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedGrade {
    pub(crate) view: GradeView,
    pub(crate) created: bool,
}

pub(crate) struct GradeLookup<'a> {
    store: &'a dyn GradeStore,
    catalog: &'a dyn Catalog,
    grading: &'a GradingSettings,
}

impl<'a> GradeLookup<'a> {
    pub(crate) fn new(
        store: &'a dyn GradeStore,
        catalog: &'a dyn Catalog,
        grading: &'a GradingSettings,
    ) -> Self {
        Self { store, catalog, grading }
    }

    pub(crate) async fn grades_for_student(
        &self,
        actor: &Actor,
        student_id: &str,
    ) -> Result<Vec<GradeView>, GradingError> {
        if actor.role == UserRole::Student && actor.user_id != student_id {
            return Err(GradingError::Unauthorized("Access Denied"));
        }

        let grades = self.store.grades_by_student(student_id).await?;
        let views = self.hydrate(grades).await?;

        Ok(self.visible_to(actor, views))
    }

    pub(crate) async fn grades_for_exam(
        &self,
        actor: &Actor,
        exam_id: &str,
    ) -> Result<Vec<GradeView>, GradingError> {
        if actor.role == UserRole::Faculty {
            let (_, course) = self.exam_with_course(exam_id).await?;
            if !can_manage_course(actor, &course) {
                return Err(GradingError::Unauthorized("Access Denied"));
            }
        }

        let grades = self.store.grades_by_exam(exam_id).await?;
        let views = self.hydrate(grades).await?;

        Ok(self.visible_to(actor, views))
    }

    pub(crate) async fn grade_status_for_student(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<GradeStatus, GradingError> {
        let status = match self.store.find_grade(student_id, exam_id).await? {
            Some(_) => GradeStatus::Graded,
            None => GradeStatus::NotGraded,
        };
        Ok(status)
    }

    /// Students enrolled in the exam's course, flagged by whether a grade exists.
    pub(crate) async fn exam_roster(
        &self,
        actor: &Actor,
        exam_id: &str,
    ) -> Result<Vec<RosterEntry>, GradingError> {
        let (exam, course) = self.exam_with_course(exam_id).await?;
        if !can_manage_course(actor, &course) {
            return Err(GradingError::Unauthorized("Access Denied"));
        }

        let students = self.catalog.enrolled_students(&course.id).await?;
        let mut roster = Vec::with_capacity(students.len());
        for student in students {
            let status = self.grade_status_for_student(&student.id, &exam.id).await?;
            roster.push(RosterEntry { student, status });
        }

        Ok(roster)
    }

    pub(crate) async fn visible_courses(&self, actor: &Actor) -> Result<Vec<Course>, GradingError> {
        match course_scope(actor) {
            CourseScope::All => self.catalog.all_courses().await,
            CourseScope::Taught(faculty_id) => self.catalog.courses_by_faculty(&faculty_id).await,
            CourseScope::Enrolled(student_id) => {
                self.catalog.courses_for_student(&student_id).await
            }
        }
    }

    pub(crate) async fn exams_for_course(
        &self,
        actor: &Actor,
        course_id: &str,
    ) -> Result<Vec<Exam>, GradingError> {
        let course = self
            .catalog
            .course(course_id)
            .await?
            .ok_or_else(|| GradingError::NotFound("Course not found".to_string()))?;

        if !can_manage_course(actor, &course) {
            return Err(GradingError::Unauthorized("Access Denied"));
        }

        self.catalog.exams_by_course(&course.id).await
    }

    /// Creates the grade for a (student, exam) pair, or re-grades it when one exists.
    pub(crate) async fn record_grade(
        &self,
        actor: &Actor,
        submission: GradeSubmission,
    ) -> Result<RecordedGrade, GradingError> {
        if actor.role == UserRole::Student {
            return Err(GradingError::Unauthorized("Access Denied"));
        }

        let marks_obtained = submission
            .marks_obtained
            .ok_or_else(|| GradingError::Validation("Please enter marks".to_string()))?;

        let (exam, course) = self.exam_with_course(&submission.exam_id).await?;

        let existing = self.store.find_grade(&submission.student_id, &exam.id).await?;
        let entry = GradeEntry {
            marks_obtained,
            feedback: submission.feedback,
            graded_by: actor.user_id.clone(),
            standing: submission.standing,
        };
        let scale = &self.grading.scale;
        let previous = existing
            .as_ref()
            .and_then(|grade| GradeRecord::restore(grade, exam.total_marks, scale).ok());
        let record = match previous {
            Some(previous) => previous.regrade(entry, primitive_now_utc(), scale)?,
            None => GradeRecord::new(
                submission.student_id.clone(),
                exam.id.clone(),
                exam.total_marks,
                entry,
                primitive_now_utc(),
                scale,
            )?,
        };

        if !can_write(actor, &record, &course) {
            return Err(GradingError::Unauthorized("Access Denied"));
        }

        if !self.catalog.is_enrolled(&course.id, &submission.student_id).await? {
            return Err(GradingError::NotFound(
                "Student is not enrolled in this course".to_string(),
            ));
        }

        let SavedGrade { grade, created } = self.store.save_grade(&record).await?;

        metrics::counter!(
            "grades_recorded_total",
            "kind" => if created { "created" } else { "regraded" }
        )
        .increment(1);
        tracing::info!(
            student_id = %grade.student_id,
            exam_id = %grade.exam_id,
            graded_by = %grade.graded_by,
            letter = %record.letter(),
            created,
            "Grade recorded"
        );

        Ok(RecordedGrade {
            view: GradeView { grade, exam: Some(exam), course: Some(course), record: Some(record) },
            created,
        })
    }

    async fn exam_with_course(&self, exam_id: &str) -> Result<(Exam, Course), GradingError> {
        let exam = self
            .catalog
            .exam(exam_id)
            .await?
            .ok_or_else(|| GradingError::NotFound("Exam not found".to_string()))?;
        let course = self
            .catalog
            .course(&exam.course_id)
            .await?
            .ok_or_else(|| GradingError::NotFound("Course not found".to_string()))?;
        Ok((exam, course))
    }

    /// Attaches exam and course metadata. Missing references are logged and
    /// left empty instead of failing the whole batch.
    async fn hydrate(&self, grades: Vec<Grade>) -> Result<Vec<GradeView>, GradingError> {
        let mut exams: HashMap<String, Option<Exam>> = HashMap::new();
        let mut courses: HashMap<String, Option<Course>> = HashMap::new();
        let mut views = Vec::with_capacity(grades.len());

        for grade in grades {
            if !exams.contains_key(&grade.exam_id) {
                let exam = self.catalog.exam(&grade.exam_id).await?;
                if exam.is_none() {
                    tracing::warn!(exam_id = %grade.exam_id, "Grade references unknown exam");
                }
                exams.insert(grade.exam_id.clone(), exam);
            }
            let exam = exams.get(&grade.exam_id).cloned().flatten();

            let course = match &exam {
                Some(exam) => {
                    if !courses.contains_key(&exam.course_id) {
                        let course = self.catalog.course(&exam.course_id).await?;
                        if course.is_none() {
                            tracing::warn!(
                                course_id = %exam.course_id,
                                "Exam references unknown course"
                            );
                        }
                        courses.insert(exam.course_id.clone(), course);
                    }
                    courses.get(&exam.course_id).cloned().flatten()
                }
                None => None,
            };

            let record = match &exam {
                Some(exam) => {
                    match GradeRecord::restore(&grade, exam.total_marks, &self.grading.scale) {
                        Ok(record) => Some(record),
                        Err(err) => {
                            tracing::warn!(
                                error = %err,
                                student_id = %grade.student_id,
                                exam_id = %grade.exam_id,
                                "Stored grade cannot be scored"
                            );
                            None
                        }
                    }
                }
                None => None,
            };

            views.push(GradeView { grade, exam, course, record });
        }

        Ok(views)
    }

    fn visible_to(&self, actor: &Actor, views: Vec<GradeView>) -> Vec<GradeView> {
        views
            .into_iter()
            .filter(|view| can_read(actor, &view.grade, view.exam.as_ref(), view.course.as_ref()))
            .collect()
    }
}
