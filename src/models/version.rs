use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    All,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::All => "all",
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "all" => Ok(Platform::All),
            other => Err(AppError::Validation(format!(
                "platform must be ios, android or all, got `{}`",
                other
            ))),
        }
    }
}

/// An app release row. `(platform, version_code)` is unique; only active,
/// non-deleted rows are visible to the resolver.
#[derive(Debug, Clone, FromRow)]
pub struct AppVersion {
    pub id: i64,
    pub platform: String,
    pub version_code: i64,
    pub version_name: String,
    pub title: String,
    pub description: String,
    pub download_url: Option<String>,
    pub is_force_update: bool,
    pub is_active: bool,
    pub release_notes: Option<String>,
    pub min_support_version: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
    pub is_delete: bool,
    pub delete_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppVersionResponse {
    pub id: i64,
    pub platform: String,
    pub version_code: i64,
    pub version_name: String,
    pub title: String,
    pub description: String,
    pub download_url: Option<String>,
    pub is_force_update: bool,
    pub is_active: bool,
    pub release_notes: Option<String>,
    pub min_support_version: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
}

impl From<AppVersion> for AppVersionResponse {
    fn from(v: AppVersion) -> Self {
        AppVersionResponse {
            id: v.id,
            platform: v.platform,
            version_code: v.version_code,
            version_name: v.version_name,
            title: v.title,
            description: v.description,
            download_url: v.download_url,
            is_force_update: v.is_force_update,
            is_active: v.is_active,
            release_notes: v.release_notes,
            min_support_version: v.min_support_version,
            create_time: v.create_time,
            update_time: v.update_time,
        }
    }
}

/// Create/update payload for a release.
#[derive(Debug, Deserialize, Validate)]
pub struct AppVersionForm {
    pub platform: Platform,

    #[validate(range(min = 1, message = "version_code must be >= 1"))]
    pub version_code: i64,

    #[validate(length(min = 1, max = 50))]
    pub version_name: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(url)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub is_force_update: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub release_notes: Option<String>,

    #[validate(range(min = 1))]
    pub min_support_version: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl AppVersionForm {
    /// Cross-field rules the derive cannot express: semantic version format,
    /// and a mandatory download URL on forced updates.
    pub fn check(&self) -> AppResult<()> {
        if !is_semver_name(&self.version_name) {
            return Err(AppError::Validation(format!(
                "version_name must look like x.y.z, got `{}`",
                self.version_name
            )));
        }
        if self.is_force_update && self.download_url.is_none() {
            return Err(AppError::Validation(
                "a force update requires a download_url".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_semver_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Client payload for the update check. Unknown fields are rejected so typos
/// surface as 400s rather than silently ignored parameters.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VersionCheckRequest {
    pub platform: Platform,

    #[validate(range(min = 1, message = "version_code must be >= 1"))]
    pub version_code: i64,

    #[validate(length(max = 50))]
    pub version_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionCheck {
    pub has_update: bool,
    pub is_force_update: bool,
    pub latest_version: Option<AppVersionResponse>,
}

impl VersionCheck {
    pub fn no_update() -> Self {
        VersionCheck {
            has_update: false,
            is_force_update: false,
            latest_version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trip() {
        for p in [Platform::Ios, Platform::Android, Platform::All] {
            assert_eq!(Platform::from_str(p.as_str()).unwrap(), p);
        }
        assert!(Platform::from_str("windows").is_err());
    }

    #[test]
    fn semver_name_format() {
        assert!(is_semver_name("1.0.0"));
        assert!(is_semver_name("12.34.56"));
        assert!(!is_semver_name("1.0"));
        assert!(!is_semver_name("1.0.0.0"));
        assert!(!is_semver_name("1.0.x"));
        assert!(!is_semver_name("1..0"));
    }

    fn form(force: bool, url: Option<&str>) -> AppVersionForm {
        AppVersionForm {
            platform: Platform::Android,
            version_code: 100,
            version_name: "1.0.0".to_string(),
            title: "Release".to_string(),
            description: String::new(),
            download_url: url.map(|s| s.to_string()),
            is_force_update: force,
            is_active: true,
            release_notes: None,
            min_support_version: None,
        }
    }

    #[test]
    fn force_update_requires_download_url() {
        assert!(form(true, None).check().is_err());
        assert!(form(true, Some("https://example.com/app.apk")).check().is_ok());
        assert!(form(false, None).check().is_ok());
    }

    #[test]
    fn bad_version_name_rejected() {
        let mut f = form(false, None);
        f.version_name = "v1.0".to_string();
        assert!(f.check().is_err());
    }
}
