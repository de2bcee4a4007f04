/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// JSON bodies above this are rejected before reaching a handler
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    // The dashboard frontend may be served from anywhere; auth is bearer
    // token based, so no cookies or origin allow-list.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check endpoint (no auth)
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        // Provide state - converts Router<AppContext> to Router<()>
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Endpoint not found" })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ApiResult<()> {
    let addr = format!("{}:{}", ctx.config.service.host, ctx.config.service.port);

    info!("Tapcard API listening on {}", ctx.service_url());
    info!("   Public base URL: {}", ctx.config.service.public_base_url);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        account::{AccountManager, CreateAdminRequest},
        config::ServerConfig,
        db,
        db::models::Role,
        directory::ProfileDirectory,
    };
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_ctx() -> AppContext {
        let config = Arc::new(ServerConfig::for_tests());
        let db = db::test_pool().await;
        let account_manager = Arc::new(AccountManager::new(db.clone(), Arc::clone(&config)));
        let directory = Arc::new(ProfileDirectory::new(db.clone(), Arc::clone(&config)));

        let ctx = AppContext {
            config,
            db,
            account_manager,
            directory,
        };
        ctx.account_manager
            .ensure_seed_admin("admin@demo.com", "admin123")
            .await
            .unwrap();
        ctx
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    fn profile_body(username: &str) -> Value {
        serde_json::json!({
            "full_name": "John Doe",
            "username": username,
            "email": "john.doe@bluewave.com",
            "phone": "+1-202-555-0101"
        })
    }

    #[tokio::test]
    async fn test_login_and_invalid_credentials() {
        let app = build_router(test_ctx().await);

        let token = login(&app, "admin@demo.com", "admin123").await;
        assert!(!token.is_empty());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/login",
                None,
                serde_json::json!({ "email": "admin@demo.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_guard_rejections() {
        let app = build_router(test_ctx().await);

        // No Authorization header
        let response = app
            .clone()
            .oneshot(get_request("/admin/profiles", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Unauthorized");

        // Tampered token
        let response = app
            .clone()
            .oneshot(get_request("/admin/profiles", Some("garbage.token.here")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid or expired token"
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_conflict() {
        let app = build_router(test_ctx().await);
        let token = login(&app, "admin@demo.com", "admin123").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&token),
                profile_body("john-doe"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&token),
                profile_body("john-doe"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["message"],
            "Username already exists"
        );
    }

    #[tokio::test]
    async fn test_public_resolver_normalizes_raw_input() {
        let ctx = test_ctx().await;
        let app = build_router(ctx.clone());
        let token = login(&app, "admin@demo.com", "admin123").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&token),
                profile_body("john-doe"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;

        // Mixed case with a trailing slash resolves the same record
        for uri in ["/profile/john-doe", "/profile/JOHN-DOE/"] {
            let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "failed for {}", uri);
            assert_eq!(body_json(response).await["id"], created["id"]);
        }

        let response = app
            .clone()
            .oneshot(get_request("/profile/nobody", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Profile not found");
    }

    #[tokio::test]
    async fn test_invalid_status_value() {
        let app = build_router(test_ctx().await);
        let token = login(&app, "admin@demo.com", "admin123").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&token),
                profile_body("john-doe"),
            ))
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/admin/profiles/{}/status", id),
                Some(&token),
                serde_json::json!({ "status": "MAYBE" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid status value");
    }

    #[tokio::test]
    async fn test_role_and_ownership_gates() {
        let ctx = test_ctx().await;
        let app = build_router(ctx.clone());
        let super_token = login(&app, "admin@demo.com", "admin123").await;

        // A plain ADMIN account
        let admin = ctx
            .account_manager
            .create_admin(CreateAdminRequest {
                full_name: "Plain Admin".to_string(),
                email: "plain@demo.com".to_string(),
                password: "password-1".to_string(),
                status: None,
                role: Some(Role::Admin),
            })
            .await
            .unwrap();
        let admin_token = login(&app, "plain@demo.com", "password-1").await;

        // SUPER_ADMIN-only surface is forbidden for ADMIN
        for uri in ["/admin/dashboard", "/admin/profiles", "/admin/users"] {
            let response = app
                .clone()
                .oneshot(get_request(uri, Some(&admin_token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "open: {}", uri);
        }

        // Two profiles, one owned by the plain admin
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&super_token),
                profile_body("owned-card"),
            ))
            .await
            .unwrap();
        let owned_id = body_json(response).await["id"].as_str().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/profiles",
                Some(&super_token),
                profile_body("other-card"),
            ))
            .await
            .unwrap();
        let other_id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/admin/profiles/{}/owner", owned_id),
                Some(&super_token),
                serde_json::json!({ "owner_admin_id": admin.id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The owner may view and toggle its own profile
        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/admin/profiles/{}", owned_id),
                Some(&admin_token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/admin/profiles/{}/status", owned_id),
                Some(&admin_token),
                serde_json::json!({ "status": "DISABLED" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // But not someone else's
        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/admin/profiles/{}", other_id),
                Some(&admin_token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Self-service linked profile follows ownership
        let response = app
            .clone()
            .oneshot(get_request("/admin/me/profile", Some(&admin_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["username"], "owned-card");
    }

    #[tokio::test]
    async fn test_health_and_unknown_route() {
        let app = build_router(test_ctx().await);

        let response = app
            .clone()
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = app
            .clone()
            .oneshot(get_request("/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
