pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod exams;
pub(crate) mod grades;
pub(crate) mod health;
pub(crate) mod users;
