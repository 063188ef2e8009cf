use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::StudentSurface;
use crate::core::state::AppState;
use crate::schemas::grade::{CourseQuery, CourseResponse, GradeRowResponse, StudentGradesResponse};
use crate::services::grading::{filter_by_course, CourseFilter, GradeSummary};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me", get(my_grades)).route("/me/courses", get(my_courses))
}

/// The student's grades, optionally narrowed to one course. The overall
/// summary always covers every grade the student can see.
async fn my_grades(
    State(state): State<AppState>,
    StudentSurface(actor): StudentSurface,
    Query(query): Query<CourseQuery>,
) -> Result<Json<StudentGradesResponse>, ApiError> {
    let order = state.settings().grading().distribution_order;
    let lookup = state.lookup();

    let views = lookup.grades_for_student(&actor, &actor.user_id).await?;
    let overall_summary = GradeSummary::from_records(&views, order);

    let filter = CourseFilter::parse(query.course_id.as_deref());
    let selected = filter_by_course(views, &filter);
    let (course_id, course_summary) = match &filter {
        CourseFilter::All => (None, None),
        CourseFilter::Course(course_id) => {
            (Some(course_id.clone()), Some(GradeSummary::from_records(&selected, order)))
        }
    };

    Ok(Json(StudentGradesResponse {
        student_id: actor.user_id.clone(),
        course_id,
        grades: selected.iter().map(GradeRowResponse::from_view).collect(),
        course_summary,
        overall_summary,
    }))
}

async fn my_courses(
    State(state): State<AppState>,
    StudentSurface(actor): StudentSurface,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = state.lookup().visible_courses(&actor).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}
