/// Database records and shared enums
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status shared by admin accounts and profiles.
/// Records are never hard-deleted, only disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Disabled,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "ACTIVE",
            RecordStatus::Disabled => "DISABLED",
        }
    }

    /// Exact-match parse; anything outside the enum is rejected.
    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "ACTIVE" => Ok(RecordStatus::Active),
            "DISABLED" => Ok(RecordStatus::Disabled),
            _ => Err(ApiError::Validation("Invalid status value".to_string())),
        }
    }
}

/// Admin role levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages only the profile assigned to it
    Admin,
    /// Full access: account management, profile creation, global listing
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            _ => Err(ApiError::Validation(format!("Invalid role: {}", s))),
        }
    }

    /// Check if this role can perform actions requiring another role
    pub fn can_act_as(&self, required: Role) -> bool {
        self >= &required
    }
}

/// Named presentation variant for the public card page, rendering-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicTheme {
    DarkMinimal,
    LightGlass,
    ClassicBlue,
}

impl PublicTheme {
    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "DARK_MINIMAL" => Ok(PublicTheme::DarkMinimal),
            "LIGHT_GLASS" => Ok(PublicTheme::LightGlass),
            "CLASSIC_BLUE" => Ok(PublicTheme::ClassicBlue),
            _ => Err(ApiError::Validation(format!("Invalid theme: {}", s))),
        }
    }
}

/// Admin account record in the database.
/// `password_hash` stays internal; outward-facing responses use
/// `account::AdminAccountView`.
#[derive(Debug, Clone, FromRow)]
pub struct AdminAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub profile_image_url: String,
    pub status: RecordStatus,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public card profile record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub company_name: String,
    pub designation: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub profile_image_url: String,
    pub linkedin_url: String,
    pub facebook_url: String,
    pub instagram_url: String,
    pub twitter_url: String,
    pub whatsapp_url: String,
    pub nfc_uid: String,
    pub qr_image_url: String,
    pub public_theme: PublicTheme,
    pub status: RecordStatus,
    pub owner_admin_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
