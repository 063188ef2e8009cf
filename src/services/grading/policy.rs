//! Who may see or write which grade records.
//!
//! Every function here is a pure decision over an explicit [`Actor`];
//! callers enforce the answer before touching storage.

use serde::Serialize;

use super::record::GradeRecord;
use super::GradingError;
use crate::db::models::{Course, Exam, Grade};
use crate::db::types::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Actor {
    pub(crate) user_id: String,
    pub(crate) role: UserRole,
}

impl Actor {
    pub(crate) fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self { user_id: user_id.into(), role }
    }
}

/// Identifies the (student, exam) pair a grade belongs to.
pub(crate) trait GradeRef {
    fn student_id(&self) -> &str;
    fn exam_id(&self) -> &str;
}

impl GradeRef for GradeRecord {
    fn student_id(&self) -> &str {
        GradeRecord::student_id(self)
    }

    fn exam_id(&self) -> &str {
        GradeRecord::exam_id(self)
    }
}

impl GradeRef for Grade {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn exam_id(&self) -> &str {
        &self.exam_id
    }
}

/// No resolved caller means the request is unauthenticated. Generic so the
/// HTTP layer can hand over its session type as well as a bare [`Actor`].
pub(crate) fn require_actor<A>(actor: Option<A>) -> Result<A, GradingError> {
    actor.ok_or(GradingError::Unauthenticated)
}

/// Faculty decisions need the hydrated exam and course; without them the
/// answer is no. Students are decided on the record's owner alone.
pub(crate) fn can_read<R: GradeRef + ?Sized>(
    actor: &Actor,
    record: &R,
    exam: Option<&Exam>,
    course: Option<&Course>,
) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Student => record.student_id() == actor.user_id,
        UserRole::Faculty => match (exam, course) {
            (Some(exam), Some(course)) => {
                exam.id == record.exam_id()
                    && exam.course_id == course.id
                    && teaches(actor, course)
            }
            _ => false,
        },
    }
}

/// `course` must be the course owning the record's exam.
pub(crate) fn can_write(actor: &Actor, record: &GradeRecord, course: &Course) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Student => false,
        UserRole::Faculty => teaches(actor, course) && record.graded_by() == actor.user_id,
    }
}

/// Course-level management (exam lists, rosters, exam-wide grade sheets).
pub(crate) fn can_manage_course(actor: &Actor, course: &Course) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Faculty => teaches(actor, course),
        UserRole::Student => false,
    }
}

fn teaches(actor: &Actor, course: &Course) -> bool {
    course.faculty_id.as_deref() == Some(actor.user_id.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CourseScope {
    All,
    Taught(String),
    Enrolled(String),
}

pub(crate) fn course_scope(actor: &Actor) -> CourseScope {
    match actor.role {
        UserRole::Admin => CourseScope::All,
        UserRole::Faculty => CourseScope::Taught(actor.user_id.clone()),
        UserRole::Student => CourseScope::Enrolled(actor.user_id.clone()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Surface {
    StudentGrades,
    GradeManagement,
}

impl Surface {
    /// The surface a role lands on after login and on wrong-role visits.
    pub(crate) fn home_for(role: UserRole) -> Self {
        match role {
            UserRole::Student => Self::StudentGrades,
            UserRole::Faculty | UserRole::Admin => Self::GradeManagement,
        }
    }

    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::StudentGrades => "/grades/me",
            Self::GradeManagement => "/management/courses",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceDecision {
    Proceed,
    Redirect(Surface),
    Authenticate,
}

/// Wrong-role visits are redirects, not errors.
pub(crate) fn route_surface(actor: Option<&Actor>, requested: Surface) -> SurfaceDecision {
    let Some(actor) = actor else {
        return SurfaceDecision::Authenticate;
    };

    let home = Surface::home_for(actor.role);

    if home == requested {
        SurfaceDecision::Proceed
    } else {
        SurfaceDecision::Redirect(home)
    }
}
