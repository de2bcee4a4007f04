/// Admin account management
///
/// Credential verification, token issuance, and CRUD over back-office
/// admin accounts.

mod manager;

pub use manager::{normalize_email, AccountManager};

use crate::db::models::{AdminAccount, RecordStatus, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Outward-facing admin account representation.
/// The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccountView {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub profile_image_url: String,
    pub status: RecordStatus,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminAccount> for AdminAccountView {
    fn from(account: AdminAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            profile_image_url: account.profile_image_url,
            status: account.status,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Admin account creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub status: Option<RecordStatus>,
    pub role: Option<Role>,
}

/// Partial admin account update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAdminRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    pub status: Option<RecordStatus>,
    pub role: Option<Role>,
}

/// Self-service account update; role and status are not self-assignable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSelfRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Self-service password change; requires the current password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Administrative password reset; does not require the old password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}
