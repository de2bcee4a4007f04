/// Authentication extractor and token utilities
use crate::{context::AppContext, db::models::Role, error::ApiError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use serde::{Deserialize, Serialize};

/// Claims carried by an admin session token.
/// Self-contained: no server-side session store, expiry is the only
/// revocation mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Normalized account email
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Extract bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Verify a session token with full validation
///
/// Fails closed: signature, expiry, and parse failures all collapse into
/// the same rejection so a caller learns nothing about why.
pub fn verify_token(token: &str, jwt_secret: &str) -> Result<AuthClaims, ApiError> {
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (5 minutes)
    validation.leeway = 300;

    decode::<AuthClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("token verification failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })
}

/// Authenticated admin context - extracts and validates the bearer token
///
/// Attaches the resolved identity for downstream authorization decisions;
/// role and ownership checks happen per operation, not here.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let claims = verify_token(&token, &state.config.authentication.jwt_secret)?;

        Ok(AuthAdmin {
            email: claims.sub,
            role: claims.role,
        })
    }
}

/// Macro to require a specific role for an operation
/// Usage: require_role!(auth, Role::SuperAdmin);
#[macro_export]
macro_rules! require_role {
    ($auth:expr, $required:expr) => {
        if !$auth.role.can_act_as($required) {
            return Err($crate::error::ApiError::Forbidden(format!(
                "Requires {} role",
                $required.as_str()
            )));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    fn make_token(secret: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = AuthClaims {
            sub: "admin@demo.com".to_string(),
            role: Role::SuperAdmin,
            iat: now,
            exp: now + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_round_trip() {
        let token = make_token(SECRET, 3600);
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "admin@demo.com");
        assert_eq!(claims.role, Role::SuperAdmin);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = make_token("another-secret-another-secret-other!", 3600);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Past the 5 minute leeway
        let token = make_token(SECRET, -3600);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify_token("not-a-token", SECRET).is_err());
        assert!(verify_token("", SECRET).is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);

        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
