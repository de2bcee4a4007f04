/// Unauthenticated public card lookup
use crate::{context::AppContext, db::models::Profile, error::ApiResult};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

pub fn routes() -> Router<AppContext> {
    // Wildcard so raw input like "john-doe/" still reaches the
    // resolver's normalization instead of missing the route.
    Router::new().route("/profile/*username", get(resolve_profile))
}

async fn resolve_profile(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = ctx.directory.resolve_by_username(&username).await?;
    Ok(Json(profile))
}
