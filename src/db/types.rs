use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Faculty,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "examtype", rename_all = "lowercase")]
pub(crate) enum ExamType {
    Quiz,
    Midterm,
    Final,
    Assignment,
    Practical,
}

/// Whether a grade carries a scored letter or an administrative standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gradestanding", rename_all = "lowercase")]
pub(crate) enum GradeStanding {
    #[default]
    Graded,
    Incomplete,
    Withdrawn,
}
