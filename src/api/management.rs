use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::ManagementSurface;
use crate::core::state::AppState;
use crate::schemas::grade::{
    CourseResponse, ExamGradesResponse, ExamResponse, GradeRowResponse, GradeUpsertRequest,
    RecordGradeResponse, RosterResponse, RosterRowResponse,
};
use crate::services::grading::{GradeStatus, GradeSubmission, GradeSummary};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:course_id/exams", get(list_exams))
        .route("/exams/:exam_id/roster", get(exam_roster))
        .route("/exams/:exam_id/grades", get(exam_grades))
        .route("/exams/:exam_id/grades/:student_id", axum::routing::put(record_grade))
}

/// Admins see every course, faculty only the ones assigned to them.
async fn list_courses(
    State(state): State<AppState>,
    ManagementSurface(actor): ManagementSurface,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = state.lookup().visible_courses(&actor).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

async fn list_exams(
    State(state): State<AppState>,
    ManagementSurface(actor): ManagementSurface,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let exams = state.lookup().exams_for_course(&actor, &course_id).await?;
    Ok(Json(exams.into_iter().map(ExamResponse::from).collect()))
}

async fn exam_roster(
    State(state): State<AppState>,
    ManagementSurface(actor): ManagementSurface,
    Path(exam_id): Path<String>,
) -> Result<Json<RosterResponse>, ApiError> {
    let entries = state.lookup().exam_roster(&actor, &exam_id).await?;
    let graded = entries.iter().filter(|entry| entry.status == GradeStatus::Graded).count();

    Ok(Json(RosterResponse {
        exam_id,
        graded,
        not_graded: entries.len() - graded,
        students: entries.into_iter().map(RosterRowResponse::from).collect(),
    }))
}

async fn exam_grades(
    State(state): State<AppState>,
    ManagementSurface(actor): ManagementSurface,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamGradesResponse>, ApiError> {
    let views = state.lookup().grades_for_exam(&actor, &exam_id).await?;
    let summary = GradeSummary::from_records(&views, state.settings().grading().distribution_order);

    Ok(Json(ExamGradesResponse {
        exam_id,
        grades: views.iter().map(GradeRowResponse::from_view).collect(),
        summary,
    }))
}

/// Enters or re-grades one student's marks. 201 on first entry, 200 on re-grade.
async fn record_grade(
    State(state): State<AppState>,
    ManagementSurface(actor): ManagementSurface,
    Path((exam_id, student_id)): Path<(String, String)>,
    Json(payload): Json<GradeUpsertRequest>,
) -> Result<(StatusCode, Json<RecordGradeResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let recorded = state
        .lookup()
        .record_grade(
            &actor,
            GradeSubmission {
                student_id,
                exam_id,
                marks_obtained: payload.marks_obtained,
                feedback: payload.feedback,
                standing: payload.standing.unwrap_or_default(),
            },
        )
        .await?;

    let status = if recorded.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(RecordGradeResponse {
            created: recorded.created,
            grade: GradeRowResponse::from_view(&recorded.view),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::db::types::UserRole;
    use crate::test_support::{self, json_request, read_json};

    #[tokio::test]
    #[ignore = "requires postgres and redis"]
    async fn faculty_grades_then_student_sees_summary() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();

        let faculty = test_support::insert_user(db, "prof", "pw-prof", UserRole::Faculty).await;
        let student = test_support::insert_user(db, "stud", "pw-stud", UserRole::Student).await;
        let course = test_support::insert_course(db, "CS101", Some(&faculty.id)).await;
        let other = test_support::insert_course(db, "MA201", None).await;
        let midterm = test_support::insert_exam(db, &course.id, "Midterm", 100.0).await;
        let quiz = test_support::insert_exam(db, &other.id, "Quiz", 20.0).await;
        test_support::enroll(db, &course.id, &student.id).await;
        test_support::enroll(db, &other.id, &student.id).await;

        let faculty_token = test_support::bearer_token(&ctx.state, &faculty.id).await;
        let student_token = test_support::bearer_token(&ctx.state, &student.id).await;
        let grade_uri = format!("/api/v1/management/exams/{}/grades/{}", midterm.id, student.id);

        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::PUT, &grade_uri, Some(&faculty_token), Some(json!({}))))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["detail"], "Please enter marks");

        let response = ctx
            .app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &grade_uri,
                Some(&faculty_token),
                Some(json!({"marks_obtained": 85.0, "feedback": "Solid work"})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["grade"]["grade"], "B");
        assert_eq!(body["grade"]["percentage"], 85.0);

        let response = ctx
            .app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &grade_uri,
                Some(&faculty_token),
                Some(json!({"marks_obtained": 93.0})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["grade"]["grade"], "A");

        let other_uri = format!("/api/v1/management/exams/{}/grades/{}", quiz.id, student.id);
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &other_uri,
                Some(&faculty_token),
                Some(json!({"marks_obtained": 10.0})),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["detail"], "Access Denied");

        let roster_uri = format!("/api/v1/management/exams/{}/roster", midterm.id);
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::GET, &roster_uri, Some(&faculty_token), None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let roster = read_json(response).await;
        assert_eq!(roster["graded"], 1);
        assert_eq!(roster["students"][0]["status"], "GRADED");

        let response = ctx
            .app
            .clone()
            .oneshot(json_request(
                Method::GET,
                &format!("/api/v1/grades/me?course_id={}", course.id),
                Some(&student_token),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let mine = read_json(response).await;
        assert_eq!(mine["grades"].as_array().map(Vec::len), Some(1));
        assert_eq!(mine["grades"][0]["exam_name"], "Midterm");
        assert_eq!(mine["course_summary"]["average_percentage"], 93.0);
        assert_eq!(mine["overall_summary"]["gpa"], 4.0);

        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::GET, "/api/v1/management/courses", Some(&faculty_token), None))
            .await
            .expect("response");
        let courses = read_json(response).await;
        assert_eq!(courses.as_array().map(Vec::len), Some(1));
        assert_eq!(courses[0]["course_code"], "CS101");
    }
}
