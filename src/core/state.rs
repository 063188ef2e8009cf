use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::grading::{GradeLookup, PgGradebook};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    gradebook: PgGradebook,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        let gradebook = PgGradebook::new(db.clone());
        Self { inner: Arc::new(InnerState { settings, db, redis, gradebook }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    /// Grade lookup bound to the Postgres gradebook and the configured scale.
    pub(crate) fn lookup(&self) -> GradeLookup<'_> {
        GradeLookup::new(
            &self.inner.gradebook,
            &self.inner.gradebook,
            self.inner.settings.grading(),
        )
    }
}
