/// Profile directory implementation using runtime sqlx queries
use crate::{
    config::ServerConfig,
    directory::{qr::QrImageGenerator, DashboardStats, ProfileInput, SearchFilter, SearchPage},
    db::models::{Profile, RecordStatus},
    error::{is_unique_violation, ApiError, ApiResult},
};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

const PROFILE_COLUMNS: &str = "id, full_name, company_name, designation, username, email, phone, \
     location, bio, profile_image_url, linkedin_url, facebook_url, instagram_url, twitter_url, \
     whatsapp_url, nfc_uid, qr_image_url, public_theme, status, owner_admin_id, created_at, updated_at";

/// Shared WHERE clause for search; ?1 is the status filter ('' = any),
/// ?2 the lowercased LIKE pattern ('' = any).
const SEARCH_WHERE: &str = "WHERE (?1 = '' OR status = ?1) \
     AND (?2 = '' OR lower(full_name) LIKE ?2 ESCAPE '\\' \
          OR lower(username) LIKE ?2 ESCAPE '\\' \
          OR lower(email) LIKE ?2 ESCAPE '\\')";

/// Normalize raw username input: trim, strip a single leading `@` and
/// any trailing slashes, lowercase.
pub fn normalize_username(raw: &str) -> String {
    let name = raw.trim();
    let name = name.strip_prefix('@').unwrap_or(name);
    name.trim_end_matches('/').trim().to_lowercase()
}

fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

/// Profile directory service
pub struct ProfileDirectory {
    db: SqlitePool,
    config: Arc<ServerConfig>,
    qr: QrImageGenerator,
}

impl ProfileDirectory {
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        let qr = QrImageGenerator::new(&config.service.public_base_url);
        Self { db, config, qr }
    }

    /// Create a new profile.
    ///
    /// The QR reference is attached here, keyed by the final public URL
    /// for the username, unless the caller supplied one.
    pub async fn create_profile(&self, input: ProfileInput) -> ApiResult<Profile> {
        let username = normalize_username(&input.username);
        self.validate_username(&username)?;
        let (full_name, email, phone) = self.validate_required(&input)?;

        if self.username_exists(&username).await? {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }

        let qr_image_url = if input.qr_image_url.trim().is_empty() {
            self.qr.image_url(&username)
        } else {
            input.qr_image_url.trim().to_string()
        };

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            full_name,
            company_name: input.company_name.trim().to_string(),
            designation: input.designation.trim().to_string(),
            username,
            email,
            phone,
            location: input.location.trim().to_string(),
            bio: input.bio.trim().to_string(),
            profile_image_url: input.profile_image_url.trim().to_string(),
            linkedin_url: input.linkedin_url.trim().to_string(),
            facebook_url: input.facebook_url.trim().to_string(),
            instagram_url: input.instagram_url.trim().to_string(),
            twitter_url: input.twitter_url.trim().to_string(),
            whatsapp_url: input.whatsapp_url.trim().to_string(),
            nfc_uid: input.nfc_uid.trim().to_string(),
            qr_image_url,
            public_theme: input
                .public_theme
                .unwrap_or(self.config.directory.default_theme),
            status: input.status.unwrap_or(RecordStatus::Active),
            owner_admin_id: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO profile (id, full_name, company_name, designation, username, email, phone, \
             location, bio, profile_image_url, linkedin_url, facebook_url, instagram_url, twitter_url, \
             whatsapp_url, nfc_uid, qr_image_url, public_theme, status, owner_admin_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.company_name)
        .bind(&profile.designation)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.profile_image_url)
        .bind(&profile.linkedin_url)
        .bind(&profile.facebook_url)
        .bind(&profile.instagram_url)
        .bind(&profile.twitter_url)
        .bind(&profile.whatsapp_url)
        .bind(&profile.nfc_uid)
        .bind(&profile.qr_image_url)
        .bind(profile.public_theme)
        .bind(profile.status)
        .bind(&profile.owner_admin_id)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Username already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        tracing::info!("profile created: {}", profile.username);
        Ok(profile)
    }

    /// Full replace of a profile's mutable fields
    pub async fn update_profile(&self, id: &str, input: ProfileInput) -> ApiResult<Profile> {
        let existing = self.get_by_id(id).await?;

        let username = normalize_username(&input.username);
        self.validate_username(&username)?;
        let (full_name, email, phone) = self.validate_required(&input)?;

        if username != existing.username && self.username_exists(&username).await? {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }

        // Keep the stored QR reference unless the caller supplied one or
        // the public URL changed out from under it.
        let qr_image_url = if !input.qr_image_url.trim().is_empty() {
            input.qr_image_url.trim().to_string()
        } else if username != existing.username {
            self.qr.image_url(&username)
        } else {
            existing.qr_image_url.clone()
        };

        let profile = Profile {
            id: existing.id.clone(),
            full_name,
            company_name: input.company_name.trim().to_string(),
            designation: input.designation.trim().to_string(),
            username,
            email,
            phone,
            location: input.location.trim().to_string(),
            bio: input.bio.trim().to_string(),
            profile_image_url: input.profile_image_url.trim().to_string(),
            linkedin_url: input.linkedin_url.trim().to_string(),
            facebook_url: input.facebook_url.trim().to_string(),
            instagram_url: input.instagram_url.trim().to_string(),
            twitter_url: input.twitter_url.trim().to_string(),
            whatsapp_url: input.whatsapp_url.trim().to_string(),
            nfc_uid: input.nfc_uid.trim().to_string(),
            qr_image_url,
            public_theme: input.public_theme.unwrap_or(existing.public_theme),
            status: input.status.unwrap_or(existing.status),
            owner_admin_id: existing.owner_admin_id.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        sqlx::query(
            "UPDATE profile SET full_name = ?1, company_name = ?2, designation = ?3, username = ?4, \
             email = ?5, phone = ?6, location = ?7, bio = ?8, profile_image_url = ?9, linkedin_url = ?10, \
             facebook_url = ?11, instagram_url = ?12, twitter_url = ?13, whatsapp_url = ?14, nfc_uid = ?15, \
             qr_image_url = ?16, public_theme = ?17, status = ?18, updated_at = ?19
             WHERE id = ?20",
        )
        .bind(&profile.full_name)
        .bind(&profile.company_name)
        .bind(&profile.designation)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.profile_image_url)
        .bind(&profile.linkedin_url)
        .bind(&profile.facebook_url)
        .bind(&profile.instagram_url)
        .bind(&profile.twitter_url)
        .bind(&profile.whatsapp_url)
        .bind(&profile.nfc_uid)
        .bind(&profile.qr_image_url)
        .bind(profile.public_theme)
        .bind(profile.status)
        .bind(profile.updated_at)
        .bind(&profile.id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Username already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(profile)
    }

    /// Status-only mutation, idempotent
    pub async fn set_status(&self, id: &str, status: RecordStatus) -> ApiResult<Profile> {
        let result = sqlx::query("UPDATE profile SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }

        tracing::info!("profile {} status set to {}", id, status.as_str());
        self.get_by_id(id).await
    }

    /// Set or clear the owning admin. The reference is weak, but the
    /// admin must exist at assignment time.
    pub async fn assign_owner(&self, id: &str, owner_admin_id: Option<String>) -> ApiResult<Profile> {
        if let Some(ref admin_id) = owner_admin_id {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM admin_account WHERE id = ?1")
                    .bind(admin_id)
                    .fetch_one(&self.db)
                    .await?;
            if count == 0 {
                return Err(ApiError::Validation("Owner admin not found".to_string()));
            }
        }

        let result =
            sqlx::query("UPDATE profile SET owner_admin_id = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(&owner_admin_id)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }

        self.get_by_id(id).await
    }

    /// Get a profile by id
    pub async fn get_by_id(&self, id: &str) -> ApiResult<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profile WHERE id = ?1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
    }

    /// Get the profile owned by an admin, if any
    pub async fn get_by_owner(&self, owner_admin_id: &str) -> ApiResult<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profile WHERE owner_admin_id = ?1 ORDER BY created_at DESC LIMIT 1",
            PROFILE_COLUMNS
        ))
        .bind(owner_admin_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No linked profile".to_string()))
    }

    /// Filtered, paginated search ordered by creation time descending.
    /// Pagination is 1-indexed; totalPages is never below 1.
    pub async fn search(&self, filter: SearchFilter, page: i64, limit: i64) -> ApiResult<SearchPage> {
        let page = page.max(1);
        let limit = limit.max(1);

        let status = filter.status.map(|s| s.as_str()).unwrap_or("");
        let pattern = filter
            .text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| like_pattern(t.trim()))
            .unwrap_or_default();

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM profile {}", SEARCH_WHERE))
                .bind(status)
                .bind(&pattern)
                .fetch_one(&self.db)
                .await?;

        let items = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profile {} ORDER BY created_at DESC LIMIT ?3 OFFSET ?4",
            PROFILE_COLUMNS, SEARCH_WHERE
        ))
        .bind(status)
        .bind(&pattern)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.db)
        .await?;

        Ok(SearchPage {
            items,
            page,
            total,
            total_pages: ((total + limit - 1) / limit).max(1),
        })
    }

    /// Aggregate dashboard counts; four independent queries, no
    /// transactional coupling.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let total_profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
            .fetch_one(&self.db)
            .await?;
        let active_profiles: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profile WHERE status = ?1")
                .bind(RecordStatus::Active)
                .fetch_one(&self.db)
                .await?;
        let disabled_profiles: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profile WHERE status = ?1")
                .bind(RecordStatus::Disabled)
                .fetch_one(&self.db)
                .await?;
        let nfc_assigned_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profile WHERE nfc_uid <> ''")
                .fetch_one(&self.db)
                .await?;

        Ok(DashboardStats {
            total_profiles,
            active_profiles,
            disabled_profiles,
            nfc_assigned_count,
        })
    }

    /// Public lookup by raw username input.
    ///
    /// Whether DISABLED profiles resolve is a deployment policy: by
    /// default the record is returned with its status and the client
    /// decides what to render.
    pub async fn resolve_by_username(&self, raw: &str) -> ApiResult<Profile> {
        let username = normalize_username(raw);
        if username.is_empty() {
            return Err(ApiError::Validation("Username is required".to_string()));
        }

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profile WHERE username = ?1",
            PROFILE_COLUMNS
        ))
        .bind(&username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

        if self.config.directory.hide_disabled && profile.status == RecordStatus::Disabled {
            return Err(ApiError::NotFound("Profile not found".to_string()));
        }

        Ok(profile)
    }

    async fn username_exists(&self, username: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    fn validate_username(&self, username: &str) -> ApiResult<()> {
        if username.is_empty() {
            return Err(ApiError::Validation("Username is required".to_string()));
        }

        if !USERNAME_RE.is_match(username) {
            return Err(ApiError::Validation(
                "Username may only contain lowercase letters, digits, and hyphens".to_string(),
            ));
        }

        Ok(())
    }

    /// Requiredness checks shared by create and update; returns the
    /// normalized (full_name, email, phone).
    fn validate_required(&self, input: &ProfileInput) -> ApiResult<(String, String, String)> {
        let full_name = input.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(ApiError::Validation("Full name is required".to_string()));
        }

        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        let phone = input.phone.trim().to_string();
        if phone.is_empty() {
            return Err(ApiError::Validation("Phone is required".to_string()));
        }

        Ok((full_name, email, phone))
    }
}
