/// Login endpoint: credential exchange for a session token
use crate::{
    account::{LoginRequest, LoginResponse},
    context::AppContext,
    error::ApiResult,
};
use axum::{extract::State, routing::post, Json, Router};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/admin/login", post(login))
}

async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let account = ctx
        .account_manager
        .verify_credentials(&req.email, &req.password)
        .await?;

    let token = ctx.account_manager.issue_token(&account)?;
    tracing::info!("login: {}", account.email);

    Ok(Json(LoginResponse { token }))
}
