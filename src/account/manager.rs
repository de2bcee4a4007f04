/// Admin account manager using runtime sqlx queries
use crate::{
    account::{CreateAdminRequest, UpdateAdminRequest, UpdateSelfRequest},
    auth::AuthClaims,
    config::ServerConfig,
    db::models::{AdminAccount, RecordStatus, Role},
    error::{is_unique_violation, ApiError, ApiResult},
};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::{PasswordHash, SaltString};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, full_name, profile_image_url, status, role, created_at, updated_at";

/// Normalize an email for storage and lookup: trimmed, lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Admin account service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Hash a password with argon2id and a fresh random salt
    pub fn hash_password(password: &str) -> ApiResult<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| ApiError::Internal(format!("Salt generation failed: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| ApiError::Internal(format!("Salt encoding failed: {}", e)))?;

        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(phc)
    }

    /// Constant-time verification against a stored PHC hash
    pub fn verify_password(password: &str, hash: &str) -> bool {
        if let Ok(parsed) = PasswordHash::new(hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        } else {
            false
        }
    }

    /// Verify login credentials against an ACTIVE account.
    ///
    /// Never reveals whether the email or the password was wrong; a
    /// DISABLED account fails the same way as an unknown one.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> ApiResult<AdminAccount> {
        let email = normalize_email(email);

        let account = sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admin_account WHERE email = ?1 AND status = ?2",
            ACCOUNT_COLUMNS
        ))
        .bind(&email)
        .bind(RecordStatus::Active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        if !Self::verify_password(password, &account.password_hash) {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        Ok(account)
    }

    /// Issue a signed, time-limited session token binding {email, role}
    pub fn issue_token(&self, account: &AdminAccount) -> ApiResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let claims = AuthClaims {
            sub: account.email.clone(),
            role: account.role,
            iat: now,
            exp: now + self.config.authentication.token_ttl_hours * 3600,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Create a new admin account
    pub async fn create_admin(&self, req: CreateAdminRequest) -> ApiResult<AdminAccount> {
        let email = normalize_email(&req.email);
        self.validate_email(&email)?;
        self.validate_password(&req.password)?;

        if self.email_exists(&email).await? {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let account = AdminAccount {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: Self::hash_password(&req.password)?,
            full_name: req.full_name.trim().to_string(),
            profile_image_url: String::new(),
            status: req.status.unwrap_or(RecordStatus::Active),
            role: req.role.unwrap_or(Role::Admin),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO admin_account (id, email, password_hash, full_name, profile_image_url, status, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.full_name)
        .bind(&account.profile_image_url)
        .bind(account.status)
        .bind(account.role)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            // The unique index is the final arbiter under concurrent creates
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        tracing::info!("admin account created: {}", account.email);
        Ok(account)
    }

    /// List all admin accounts, newest first
    pub async fn list_admins(&self) -> ApiResult<Vec<AdminAccount>> {
        let accounts = sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admin_account ORDER BY created_at DESC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(accounts)
    }

    /// Get an admin account by id
    pub async fn get_admin(&self, id: &str) -> ApiResult<AdminAccount> {
        sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admin_account WHERE id = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))
    }

    /// Get an admin account by normalized email
    pub async fn get_by_email(&self, email: &str) -> ApiResult<AdminAccount> {
        sqlx::query_as::<_, AdminAccount>(&format!(
            "SELECT {} FROM admin_account WHERE email = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))
    }

    /// Partial update of an admin account
    pub async fn update_admin(&self, id: &str, fields: UpdateAdminRequest) -> ApiResult<AdminAccount> {
        let mut account = self.get_admin(id).await?;

        if let Some(email) = fields.email {
            let email = normalize_email(&email);
            self.validate_email(&email)?;
            if email != account.email && self.email_exists(&email).await? {
                return Err(ApiError::Conflict("Email already exists".to_string()));
            }
            account.email = email;
        }
        if let Some(full_name) = fields.full_name {
            account.full_name = full_name.trim().to_string();
        }
        if let Some(url) = fields.profile_image_url {
            account.profile_image_url = url;
        }
        if let Some(status) = fields.status {
            account.status = status;
        }
        if let Some(role) = fields.role {
            account.role = role;
        }
        account.updated_at = Utc::now();

        self.persist(&account).await?;
        Ok(account)
    }

    /// Toggle ACTIVE/DISABLED for an admin account.
    /// A DISABLED admin is rejected at login from then on.
    pub async fn set_admin_status(&self, id: &str, status: RecordStatus) -> ApiResult<AdminAccount> {
        let result = sqlx::query(
            "UPDATE admin_account SET status = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Admin not found".to_string()));
        }

        tracing::info!("admin {} status set to {}", id, status.as_str());
        self.get_admin(id).await
    }

    /// Administrative password reset; the old password is not required
    pub async fn reset_password(&self, id: &str, new_password: &str) -> ApiResult<()> {
        self.validate_password(new_password)?;
        let password_hash = Self::hash_password(new_password)?;

        let result = sqlx::query(
            "UPDATE admin_account SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(&password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Admin not found".to_string()));
        }

        Ok(())
    }

    /// Self-service account update for the authenticated admin
    pub async fn update_self(&self, email: &str, fields: UpdateSelfRequest) -> ApiResult<AdminAccount> {
        let account = self.get_by_email(email).await?;
        self.update_admin(
            &account.id,
            UpdateAdminRequest {
                full_name: fields.full_name,
                email: fields.email,
                profile_image_url: fields.profile_image_url,
                status: None,
                role: None,
            },
        )
        .await
    }

    /// Self-service password change; fails unless the current password matches
    pub async fn change_own_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let account = self.get_by_email(email).await?;

        if !Self::verify_password(current_password, &account.password_hash) {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        self.reset_password(&account.id, new_password).await
    }

    /// Upsert the configured bootstrap SUPER_ADMIN on startup. Idempotent.
    pub async fn ensure_seed_admin(&self, email: &str, password: &str) -> ApiResult<()> {
        let email = normalize_email(email);
        self.validate_email(&email)?;
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO admin_account (id, email, password_hash, full_name, profile_image_url, status, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, '', '', 'ACTIVE', 'SUPER_ADMIN', ?4, ?4)
             ON CONFLICT(email) DO UPDATE SET
                 password_hash = excluded.password_hash,
                 status = 'ACTIVE',
                 updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::info!("seed admin ensured: {}", email);
        Ok(())
    }

    async fn persist(&self, account: &AdminAccount) -> ApiResult<()> {
        sqlx::query(
            "UPDATE admin_account
             SET email = ?1, full_name = ?2, profile_image_url = ?3, status = ?4, role = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(&account.profile_image_url)
        .bind(account.status)
        .bind(account.role)
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_account WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    fn validate_email(&self, email: &str) -> ApiResult<()> {
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        Ok(())
    }

    fn validate_password(&self, password: &str) -> ApiResult<()> {
        if password.len() < 8 {
            return Err(ApiError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn manager() -> AccountManager {
        let pool = db::test_pool().await;
        AccountManager::new(pool, Arc::new(ServerConfig::for_tests()))
    }

    fn create_req(email: &str, password: &str) -> CreateAdminRequest {
        CreateAdminRequest {
            full_name: "Test Admin".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            status: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_email_stored_normalized_and_login_mixed_case() {
        let mgr = manager().await;
        let account = mgr
            .create_admin(create_req("  Admin@Demo.COM ", "admin123"))
            .await
            .unwrap();
        assert_eq!(account.email, "admin@demo.com");

        // Mixed-case login against the normalized record succeeds
        let found = mgr
            .verify_credentials("ADMIN@demo.com", "admin123")
            .await
            .unwrap();
        assert_eq!(found.id, account.id);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let mgr = manager().await;
        mgr.create_admin(create_req("admin@demo.com", "admin123"))
            .await
            .unwrap();

        let err = mgr
            .verify_credentials("admin@demo.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_disabled_admin_cannot_login() {
        let mgr = manager().await;
        let account = mgr
            .create_admin(create_req("admin@demo.com", "admin123"))
            .await
            .unwrap();

        mgr.set_admin_status(&account.id, RecordStatus::Disabled)
            .await
            .unwrap();

        // Correct password, still rejected, same error as a bad password
        let err = mgr
            .verify_credentials("admin@demo.com", "admin123")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict_case_insensitive() {
        let mgr = manager().await;
        mgr.create_admin(create_req("admin@demo.com", "admin123"))
            .await
            .unwrap();

        let err = mgr
            .create_admin(create_req("ADMIN@DEMO.COM", "other-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let mgr = manager().await;
        let account = mgr
            .create_admin(CreateAdminRequest {
                role: Some(Role::SuperAdmin),
                ..create_req("admin@demo.com", "admin123")
            })
            .await
            .unwrap();

        let token = mgr.issue_token(&account).unwrap();
        let claims =
            crate::auth::verify_token(&token, &ServerConfig::for_tests().authentication.jwt_secret)
                .unwrap();
        assert_eq!(claims.sub, "admin@demo.com");
        assert_eq!(claims.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_reset_password() {
        let mgr = manager().await;
        let account = mgr
            .create_admin(create_req("admin@demo.com", "admin123"))
            .await
            .unwrap();

        mgr.reset_password(&account.id, "new-password-1").await.unwrap();

        assert!(mgr
            .verify_credentials("admin@demo.com", "admin123")
            .await
            .is_err());
        assert!(mgr
            .verify_credentials("admin@demo.com", "new-password-1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_own_password_requires_current() {
        let mgr = manager().await;
        mgr.create_admin(create_req("admin@demo.com", "admin123"))
            .await
            .unwrap();

        let err = mgr
            .change_own_password("admin@demo.com", "wrong-current", "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        mgr.change_own_password("admin@demo.com", "admin123", "new-password-1")
            .await
            .unwrap();
        assert!(mgr
            .verify_credentials("admin@demo.com", "new-password-1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_and_email_conflict() {
        let mgr = manager().await;
        let a = mgr
            .create_admin(create_req("a@demo.com", "password-1"))
            .await
            .unwrap();
        mgr.create_admin(create_req("b@demo.com", "password-2"))
            .await
            .unwrap();

        let updated = mgr
            .update_admin(
                &a.id,
                UpdateAdminRequest {
                    full_name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Renamed");
        assert_eq!(updated.email, "a@demo.com");

        let err = mgr
            .update_admin(
                &a.id,
                UpdateAdminRequest {
                    email: Some("B@demo.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let mgr = manager().await;
        mgr.ensure_seed_admin("admin@demo.com", "admin123").await.unwrap();
        mgr.ensure_seed_admin("admin@demo.com", "rotated-pass").await.unwrap();

        let admins = mgr.list_admins().await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].role, Role::SuperAdmin);

        // Seeding rotates the password in place
        assert!(mgr
            .verify_credentials("admin@demo.com", "rotated-pass")
            .await
            .is_ok());
    }
}
