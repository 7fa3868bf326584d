//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use glowminder_app::ports::{Clock, ReminderRepository, TaskQueue};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level.
pub fn build<R, Q, C>(state: AppState<R, Q, C>) -> Router
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
