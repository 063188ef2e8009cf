use std::sync::Mutex;

use async_trait::async_trait;
use time::macros::datetime;

use super::record::GradeRecord;
use super::store::{Catalog, GradeStore, SavedGrade};
use super::GradingError;
use crate::db::models::{Course, Exam, Grade, StudentSummary};
use crate::db::types::ExamType;

#[derive(Default)]
struct Tables {
    courses: Vec<Course>,
    exams: Vec<Exam>,
    enrollments: Vec<(String, String)>,
    grades: Vec<Grade>,
}

/// In-process gradebook for exercising the lookup service without Postgres.
#[derive(Default)]
pub(crate) struct MemoryGradebook {
    tables: Mutex<Tables>,
}

impl MemoryGradebook {
    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("memory gradebook lock");
        f(&mut tables)
    }

    pub(crate) fn add_course(&self, id: &str, code: &str, name: &str, faculty_id: Option<&str>) {
        self.with(|tables| {
            tables.courses.push(Course {
                id: id.to_string(),
                course_code: code.to_string(),
                course_name: name.to_string(),
                faculty_id: faculty_id.map(str::to_string),
                created_at: datetime!(2025-01-01 0:00),
            })
        });
    }

    pub(crate) fn add_exam(&self, id: &str, course_id: &str, name: &str, total_marks: f64) {
        self.with(|tables| {
            tables.exams.push(Exam {
                id: id.to_string(),
                course_id: course_id.to_string(),
                exam_name: name.to_string(),
                exam_type: ExamType::Midterm,
                total_marks,
                created_at: datetime!(2025-01-02 0:00),
            })
        });
    }

    pub(crate) fn remove_exam(&self, id: &str) {
        self.with(|tables| tables.exams.retain(|exam| exam.id != id));
    }

    pub(crate) fn enroll(&self, course_id: &str, student_id: &str) {
        self.with(|tables| {
            tables.enrollments.push((course_id.to_string(), student_id.to_string()))
        });
    }

    pub(crate) fn grade_count(&self) -> usize {
        self.with(|tables| tables.grades.len())
    }
}

#[async_trait]
impl GradeStore for MemoryGradebook {
    async fn find_grade(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Result<Option<Grade>, GradingError> {
        Ok(self.with(|tables| {
            tables
                .grades
                .iter()
                .find(|grade| grade.student_id == student_id && grade.exam_id == exam_id)
                .cloned()
        }))
    }

    async fn save_grade(&self, record: &GradeRecord) -> Result<SavedGrade, GradingError> {
        Ok(self.with(|tables| {
            let existing = tables.grades.iter_mut().find(|grade| {
                grade.student_id == record.student_id() && grade.exam_id == record.exam_id()
            });
            match existing {
                Some(grade) => {
                    grade.marks_obtained = record.marks_obtained();
                    grade.feedback = record.feedback().map(str::to_string);
                    grade.graded_by = record.graded_by().to_string();
                    grade.standing = record.standing();
                    grade.graded_at = record.graded_at();
                    SavedGrade { grade: grade.clone(), created: false }
                }
                None => {
                    let grade = Grade {
                        id: format!("g{}", tables.grades.len() + 1),
                        student_id: record.student_id().to_string(),
                        exam_id: record.exam_id().to_string(),
                        marks_obtained: record.marks_obtained(),
                        feedback: record.feedback().map(str::to_string),
                        graded_by: record.graded_by().to_string(),
                        standing: record.standing(),
                        graded_at: record.graded_at(),
                        created_at: record.graded_at(),
                    };
                    tables.grades.push(grade.clone());
                    SavedGrade { grade, created: true }
                }
            }
        }))
    }

    async fn grades_by_student(&self, student_id: &str) -> Result<Vec<Grade>, GradingError> {
        Ok(self.with(|tables| {
            tables.grades.iter().filter(|grade| grade.student_id == student_id).cloned().collect()
        }))
    }

    async fn grades_by_exam(&self, exam_id: &str) -> Result<Vec<Grade>, GradingError> {
        Ok(self.with(|tables| {
            tables.grades.iter().filter(|grade| grade.exam_id == exam_id).cloned().collect()
        }))
    }
}

#[async_trait]
impl Catalog for MemoryGradebook {
    async fn exam(&self, exam_id: &str) -> Result<Option<Exam>, GradingError> {
        Ok(self.with(|tables| tables.exams.iter().find(|exam| exam.id == exam_id).cloned()))
    }

    async fn course(&self, course_id: &str) -> Result<Option<Course>, GradingError> {
        Ok(self
            .with(|tables| tables.courses.iter().find(|course| course.id == course_id).cloned()))
    }

    async fn courses_by_faculty(&self, faculty_id: &str) -> Result<Vec<Course>, GradingError> {
        Ok(self.with(|tables| {
            tables
                .courses
                .iter()
                .filter(|course| course.faculty_id.as_deref() == Some(faculty_id))
                .cloned()
                .collect()
        }))
    }

    async fn exams_by_course(&self, course_id: &str) -> Result<Vec<Exam>, GradingError> {
        Ok(self.with(|tables| {
            tables.exams.iter().filter(|exam| exam.course_id == course_id).cloned().collect()
        }))
    }

    async fn all_courses(&self) -> Result<Vec<Course>, GradingError> {
        Ok(self.with(|tables| tables.courses.clone()))
    }

    async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, GradingError> {
        Ok(self.with(|tables| {
            tables
                .courses
                .iter()
                .filter(|course| {
                    tables
                        .enrollments
                        .iter()
                        .any(|(course_id, student)| *course_id == course.id && student == student_id)
                })
                .cloned()
                .collect()
        }))
    }

    async fn enrolled_students(
        &self,
        course_id: &str,
    ) -> Result<Vec<StudentSummary>, GradingError> {
        Ok(self.with(|tables| {
            let mut students: Vec<StudentSummary> = tables
                .enrollments
                .iter()
                .filter(|(course, _)| course == course_id)
                .map(|(_, student_id)| StudentSummary {
                    id: student_id.clone(),
                    username: format!("student{student_id}"),
                    full_name: format!("Student {student_id}"),
                })
                .collect();
            students.sort_by(|left, right| left.id.cmp(&right.id));
            students
        }))
    }

    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> Result<bool, GradingError> {
        Ok(self.with(|tables| {
            tables
                .enrollments
                .iter()
                .any(|(course, student)| course == course_id && student == student_id)
        }))
    }
}
