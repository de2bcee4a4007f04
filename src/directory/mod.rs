/// Profile directory
///
/// CRUD over public card profiles, uniqueness enforcement on username,
/// filtered/paginated search, and the public username resolver.

mod manager;
pub mod qr;

pub use manager::{normalize_username, ProfileDirectory};

use crate::db::models::{Profile, PublicTheme, RecordStatus};
use serde::{Deserialize, Serialize};

/// Allow-listed profile fields for create and full update.
/// Unknown fields in a request body are dropped rather than merged into
/// the stored document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub facebook_url: String,
    #[serde(default)]
    pub instagram_url: String,
    #[serde(default)]
    pub twitter_url: String,
    #[serde(default)]
    pub whatsapp_url: String,
    #[serde(default)]
    pub nfc_uid: String,
    #[serde(default)]
    pub qr_image_url: String,
    pub public_theme: Option<PublicTheme>,
    pub status: Option<RecordStatus>,
}

/// Search filter for the admin profile listing
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring across full_name, username, and email
    pub text: Option<String>,
    pub status: Option<RecordStatus>,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Profile>,
    pub page: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Aggregate dashboard counts. The four counts are independent queries;
/// minor skew under concurrent writes is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_profiles: i64,
    pub active_profiles: i64,
    pub disabled_profiles: i64,
    pub nfc_assigned_count: i64,
}

/// Coerce a raw query-string value into a positive page/limit number.
/// Non-numeric or non-positive input falls back to the default.
pub fn coerce_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_positive() {
        assert_eq!(coerce_positive(Some("3"), 1), 3);
        assert_eq!(coerce_positive(Some(" 7 "), 1), 7);
        assert_eq!(coerce_positive(Some("0"), 1), 1);
        assert_eq!(coerce_positive(Some("-2"), 10), 10);
        assert_eq!(coerce_positive(Some("abc"), 10), 10);
        assert_eq!(coerce_positive(None, 10), 10);
    }
}
