/// Admin account registry and self-service endpoints
use crate::{
    account::{
        AdminAccountView, ChangePasswordRequest, CreateAdminRequest, ResetPasswordRequest,
        UpdateAdminRequest, UpdateSelfRequest,
    },
    auth::AuthAdmin,
    context::AppContext,
    db::models::{Profile, RecordStatus, Role},
    directory::ProfileInput,
    error::ApiResult,
    require_role,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;

/// Build admin account management and self-service routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/users", get(list_admins).post(create_admin))
        .route("/admin/users/:id", put(update_admin))
        .route("/admin/users/:id/status", patch(set_admin_status))
        .route("/admin/users/:id/password", post(reset_password))
        .route("/admin/me", get(get_self).put(update_self))
        .route("/admin/me/password", patch(change_own_password))
        .route("/admin/me/profile", get(get_own_profile).put(update_own_profile))
}

async fn list_admins(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
) -> ApiResult<Json<Vec<AdminAccountView>>> {
    require_role!(auth, Role::SuperAdmin);

    let admins = ctx.account_manager.list_admins().await?;
    Ok(Json(admins.into_iter().map(AdminAccountView::from).collect()))
}

async fn create_admin(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Json(req): Json<CreateAdminRequest>,
) -> ApiResult<(StatusCode, Json<AdminAccountView>)> {
    require_role!(auth, Role::SuperAdmin);

    let account = ctx.account_manager.create_admin(req).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

async fn update_admin(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<UpdateAdminRequest>,
) -> ApiResult<Json<AdminAccountView>> {
    require_role!(auth, Role::SuperAdmin);

    let account = ctx.account_manager.update_admin(&id, req).await?;
    Ok(Json(account.into()))
}

#[derive(Deserialize)]
struct SetStatusRequest {
    #[serde(default)]
    status: String,
}

async fn set_admin_status(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<AdminAccountView>> {
    require_role!(auth, Role::SuperAdmin);

    let status = RecordStatus::from_str(&req.status)?;
    let account = ctx.account_manager.set_admin_status(&id, status).await?;
    Ok(Json(account.into()))
}

async fn reset_password(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Path(id): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_role!(auth, Role::SuperAdmin);

    ctx.account_manager
        .reset_password(&id, &req.new_password)
        .await?;
    Ok(Json(serde_json::json!({})))
}

async fn get_self(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
) -> ApiResult<Json<AdminAccountView>> {
    let account = ctx.account_manager.get_by_email(&auth.email).await?;
    Ok(Json(account.into()))
}

async fn update_self(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Json(req): Json<UpdateSelfRequest>,
) -> ApiResult<Json<AdminAccountView>> {
    let account = ctx.account_manager.update_self(&auth.email, req).await?;
    Ok(Json(account.into()))
}

async fn change_own_password(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.account_manager
        .change_own_password(&auth.email, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(serde_json::json!({})))
}

async fn get_own_profile(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
) -> ApiResult<Json<Profile>> {
    let account = ctx.account_manager.get_by_email(&auth.email).await?;
    let profile = ctx.directory.get_by_owner(&account.id).await?;
    Ok(Json(profile))
}

async fn update_own_profile(
    State(ctx): State<AppContext>,
    auth: AuthAdmin,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Json<Profile>> {
    let account = ctx.account_manager.get_by_email(&auth.email).await?;
    let profile = ctx.directory.get_by_owner(&account.id).await?;

    Ok(Json(ctx.directory.update_profile(&profile.id, input).await?))
}
