/// Dashboard and profile management endpoints
use crate::{
    auth::AuthAdmin,
    context::AppContext,
    db::models::{Profile, RecordStatus, Role},
    directory::{coerce_positive, DashboardStats, ProfileInput, SearchFilter, SearchPage},
    error::{ApiError, ApiResult},
    require_role,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

/// Build dashboard and profile routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/profiles", get(list_profiles).post(create_profile))
        .route("/admin/profiles/:id", get(get_profile).put(update_profile))
        .route("/admin/profiles/:id/status", patch(set_profile_status))
        .route("/admin/profiles/:id/owner", patch(assign_profile_owner))
}

/// Owner-or-SUPER_ADMIN check for per-profile operations
async fn ensure_can_manage(
    ctx: &AppContext,
    auth: &AuthAdmin,
    profile: &Profile,
) -> ApiResult<()> {
    if auth.role.can_act_as(Role::SuperAdmin) {
        return Ok(());
    }

    let account = ctx.account_manager.get_by_email(&auth.email).await?;
    if profile.owner_admin_id.as_deref() == Some(account.id.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not manage this profile".to_string(),
        ))
    }
}

async fn dashboard(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
) -> ApiResult<Json<DashboardStats>> {
    require_role!(auth, Role::SuperAdmin);

    Ok(Json(ctx.directory.dashboard_stats().await?))
}

/// Query parameters for the profile listing.
/// page/limit are taken as raw strings so malformed values fall back to
/// their defaults instead of rejecting the request.
#[derive(Deserialize)]
struct ListQuery {
    search: Option<String>,
    status: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

async fn list_profiles(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<SearchPage>> {
    require_role!(auth, Role::SuperAdmin);

    let page = coerce_positive(query.page.as_deref(), 1);
    let limit = coerce_positive(query.limit.as_deref(), 10);
    let filter = SearchFilter {
        text: query.search,
        // Anything other than an exact status value is ignored
        status: query
            .status
            .as_deref()
            .and_then(|s| RecordStatus::from_str(s).ok()),
    };

    Ok(Json(ctx.directory.search(filter, page, limit).await?))
}

async fn get_profile(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = ctx.directory.get_by_id(&id).await?;
    ensure_can_manage(&ctx, &auth, &profile).await?;

    Ok(Json(profile))
}

async fn create_profile(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Json(input): Json<ProfileInput>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    require_role!(auth, Role::SuperAdmin);

    let profile = ctx.directory.create_profile(input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Json<Profile>> {
    let profile = ctx.directory.get_by_id(&id).await?;
    ensure_can_manage(&ctx, &auth, &profile).await?;

    Ok(Json(ctx.directory.update_profile(&id, input).await?))
}

#[derive(Deserialize)]
struct SetStatusRequest {
    #[serde(default)]
    status: String,
}

async fn set_profile_status(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Profile>> {
    let status = RecordStatus::from_str(&req.status)?;

    let profile = ctx.directory.get_by_id(&id).await?;
    ensure_can_manage(&ctx, &auth, &profile).await?;

    Ok(Json(ctx.directory.set_status(&id, status).await?))
}

#[derive(Deserialize)]
struct AssignOwnerRequest {
    owner_admin_id: Option<String>,
}

async fn assign_profile_owner(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<AssignOwnerRequest>,
) -> ApiResult<Json<Profile>> {
    require_role!(auth, Role::SuperAdmin);

    Ok(Json(
        ctx.directory.assign_owner(&id, req.owner_admin_id).await?,
    ))
}
