//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod conversations;
#[allow(clippy::missing_errors_doc)]
pub mod reminders;

use axum::Router;
use axum::routing::{get, post};

use glowminder_app::ports::{Clock, ReminderRepository, TaskQueue};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, Q, C>() -> Router<AppState<R, Q, C>>
where
    R: ReminderRepository + 'static,
    Q: TaskQueue + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/reminders",
            get(reminders::list::<R, Q, C>).post(reminders::create::<R, Q, C>),
        )
        .route(
            "/reminders/{id}",
            get(reminders::get::<R, Q, C>)
                .patch(reminders::update::<R, Q, C>)
                .delete(reminders::delete::<R, Q, C>),
        )
        .route(
            "/conversations/{owner_id}",
            get(conversations::step::<R, Q, C>).post(conversations::handle::<R, Q, C>),
        )
}
