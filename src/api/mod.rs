/// HTTP API route modules
use crate::context::AppContext;
use axum::Router;

pub mod admin;
pub mod public;
pub mod session;
pub mod users;

/// Build all API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(session::routes())
        .merge(admin::routes())
        .merge(users::routes())
        .merge(public::routes())
}
