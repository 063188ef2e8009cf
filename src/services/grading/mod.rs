//! Grade computation, aggregation and visibility rules.
//!
//! Everything in here is synchronous and side-effect free except the
//! collaborator traits in [`store`], which the lookup service drives.

mod lookup;
#[cfg(test)]
pub(crate) mod memory;
mod policy;
mod postgres;
mod record;
mod scale;
mod stats;
mod store;

use thiserror::Error;

pub(crate) use lookup::{
    filter_by_course, CourseFilter, GradeLookup, GradeStatus, GradeSubmission, GradeView,
    RosterEntry,
};
pub(crate) use policy::{require_actor, route_surface, Actor, Surface, SurfaceDecision};
pub(crate) use postgres::PgGradebook;
pub(crate) use scale::{GradeLetter, GradeScale};
pub(crate) use stats::{DistributionOrder, GradeSummary, Scored};

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("{0}")]
    Validation(String),
    #[error("exam total must be positive, got {total}")]
    Division { total: f64 },
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}
