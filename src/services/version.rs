use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::version::{AppVersion, AppVersionForm, Platform, VersionCheck};
use crate::utils::time::now_timestamp;

const VERSION_COLUMNS: &str = r#"
    id, platform, version_code, version_name, title, description, download_url,
    is_force_update, is_active, release_notes, min_support_version,
    create_time, update_time, is_delete, delete_time
"#;

/// Pick the update candidate: the greatest `version_code` among rows that
/// are active and not soft-deleted. Ties across platform scopes keep the
/// first row seen, so the caller's ordering decides.
pub fn pick_latest(candidates: &[AppVersion]) -> Option<&AppVersion> {
    candidates
        .iter()
        .filter(|row| row.is_active && !row.is_delete)
        .fold(None, |best: Option<&AppVersion>, row| match best {
            Some(b) if b.version_code >= row.version_code => Some(b),
            _ => Some(row),
        })
}

/// The version-check decision. Pure over the already-fetched candidate:
/// no candidate means no update; a forced update comes from the release flag
/// or from falling below `min_support_version`.
pub fn resolve_update(current_version_code: i64, latest: Option<&AppVersion>) -> VersionCheck {
    let latest = match latest {
        Some(v) => v,
        None => return VersionCheck::no_update(),
    };

    let has_update = current_version_code < latest.version_code;
    if !has_update {
        return VersionCheck::no_update();
    }

    let below_floor = latest
        .min_support_version
        .is_some_and(|floor| current_version_code < floor);

    VersionCheck {
        has_update: true,
        is_force_update: latest.is_force_update || below_floor,
        latest_version: Some(latest.clone().into()),
    }
}

pub struct VersionService<'a> {
    db: &'a Database,
}

impl<'a> VersionService<'a> {
    pub fn new(db: &'a Database) -> Self {
        VersionService { db }
    }

    /// The newest active release visible to `platform`: its own rows unioned
    /// with the platform-agnostic `all` tier. Candidates arrive in descending
    /// `version_code` order and the selection goes through `pick_latest`.
    pub async fn latest_active(&self, platform: Platform) -> AppResult<Option<AppVersion>> {
        let candidates = sqlx::query_as::<_, AppVersion>(&format!(
            r#"
            SELECT {VERSION_COLUMNS} FROM app_version
            WHERE (platform = $1 OR platform = 'all')
              AND is_active = TRUE AND is_delete = FALSE
            ORDER BY version_code DESC
            "#
        ))
        .bind(platform.as_str())
        .fetch_all(&self.db.pool)
        .await?;

        Ok(pick_latest(&candidates).cloned())
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<AppVersion>> {
        let result = sqlx::query_as::<_, AppVersion>(&format!(
            r#"SELECT {VERSION_COLUMNS} FROM app_version WHERE id = $1 AND is_delete = FALSE"#
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn list(
        &self,
        platform: Option<Platform>,
        is_active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(i64, Vec<AppVersion>)> {
        let platform = platform.map(|p| p.as_str());

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM app_version
            WHERE is_delete = FALSE
              AND ($1::text IS NULL OR platform = $1)
              AND ($2::bool IS NULL OR is_active = $2)
            "#,
        )
        .bind(platform)
        .bind(is_active)
        .fetch_one(&self.db.pool)
        .await?;

        let rows = sqlx::query_as::<_, AppVersion>(&format!(
            r#"
            SELECT {VERSION_COLUMNS} FROM app_version
            WHERE is_delete = FALSE
              AND ($1::text IS NULL OR platform = $1)
              AND ($2::bool IS NULL OR is_active = $2)
            ORDER BY version_code DESC, create_time DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(platform)
        .bind(is_active)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;

        Ok((count, rows))
    }

    pub async fn create(&self, form: &AppVersionForm) -> AppResult<AppVersion> {
        self.ensure_code_free(form.platform, form.version_code, None)
            .await?;

        let now = now_timestamp();
        let version = sqlx::query_as::<_, AppVersion>(&format!(
            r#"
            INSERT INTO app_version (platform, version_code, version_name, title, description,
                                     download_url, is_force_update, is_active, release_notes,
                                     min_support_version, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(form.platform.as_str())
        .bind(form.version_code)
        .bind(&form.version_name)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.download_url.as_deref())
        .bind(form.is_force_update)
        .bind(form.is_active)
        .bind(form.release_notes.as_deref())
        .bind(form.min_support_version)
        .bind(now)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(version)
    }

    /// Whole-row replacement; concurrent writers resolve by last-write-wins.
    pub async fn update(&self, id: i64, form: &AppVersionForm) -> AppResult<AppVersion> {
        self.ensure_code_free(form.platform, form.version_code, Some(id))
            .await?;

        let now = now_timestamp();
        let version = sqlx::query_as::<_, AppVersion>(&format!(
            r#"
            UPDATE app_version
            SET platform = $2, version_code = $3, version_name = $4, title = $5,
                description = $6, download_url = $7, is_force_update = $8, is_active = $9,
                release_notes = $10, min_support_version = $11, update_time = $12
            WHERE id = $1 AND is_delete = FALSE
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(form.platform.as_str())
        .bind(form.version_code)
        .bind(&form.version_name)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.download_url.as_deref())
        .bind(form.is_force_update)
        .bind(form.is_active)
        .bind(form.release_notes.as_deref())
        .bind(form.min_support_version)
        .bind(now)
        .fetch_optional(&self.db.pool)
        .await?;

        version.ok_or_else(|| AppError::NotFound("Version not found".to_string()))
    }

    pub async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            UPDATE app_version
            SET is_delete = TRUE, delete_time = $2, update_time = $2
            WHERE id = $1 AND is_delete = FALSE
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Version not found".to_string()));
        }
        Ok(())
    }

    /// `(platform, version_code)` is unique among live rows. Checked up front
    /// for a readable message; the DB constraint still backstops races.
    async fn ensure_code_free(
        &self,
        platform: Platform,
        version_code: i64,
        exclude_id: Option<i64>,
    ) -> AppResult<()> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM app_version
                WHERE platform = $1 AND version_code = $2 AND is_delete = FALSE
                  AND ($3::bigint IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(platform.as_str())
        .bind(version_code)
        .bind(exclude_id)
        .fetch_one(&self.db.pool)
        .await?;

        if exists {
            return Err(AppError::Validation(format!(
                "version_code {} already exists for platform {}",
                version_code,
                platform.as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(platform: &str, code: i64) -> AppVersion {
        AppVersion {
            id: code,
            platform: platform.to_string(),
            version_code: code,
            version_name: format!("{}.0.0", code / 100),
            title: "Release".to_string(),
            description: String::new(),
            download_url: Some("https://example.com/app.apk".to_string()),
            is_force_update: false,
            is_active: true,
            release_notes: None,
            min_support_version: None,
            create_time: 0,
            update_time: 0,
            is_delete: false,
            delete_time: None,
        }
    }

    #[test]
    fn no_candidate_means_no_update() {
        let check = resolve_update(100, None);
        assert!(!check.has_update);
        assert!(!check.is_force_update);
        assert!(check.latest_version.is_none());
    }

    #[test]
    fn newer_all_row_updates_android_client() {
        let latest = row("all", 200);
        let check = resolve_update(100, Some(&latest));
        assert!(check.has_update);
        assert!(!check.is_force_update);
        assert_eq!(check.latest_version.unwrap().version_code, 200);
    }

    #[test]
    fn up_to_date_client_gets_nothing() {
        let latest = row("android", 200);
        let check = resolve_update(200, Some(&latest));
        assert!(!check.has_update);
        assert!(check.latest_version.is_none());

        let check = resolve_update(250, Some(&latest));
        assert!(!check.has_update);
    }

    #[test]
    fn force_flag_carries_through() {
        let mut latest = row("ios", 300);
        latest.is_force_update = true;
        let check = resolve_update(100, Some(&latest));
        assert!(check.has_update);
        assert!(check.is_force_update);
    }

    #[test]
    fn min_support_version_escalates_optional_release() {
        let mut latest = row("all", 200);
        latest.min_support_version = Some(180);

        // Client below the floor: forced even though the release is optional.
        let check = resolve_update(150, Some(&latest));
        assert!(check.has_update);
        assert!(check.is_force_update);

        // Client at or above the floor: plain optional update.
        let check = resolve_update(180, Some(&latest));
        assert!(check.has_update);
        assert!(!check.is_force_update);
    }

    #[test]
    fn force_only_reported_alongside_an_update() {
        // Floor below current but release not newer: no update, no force.
        let mut latest = row("all", 200);
        latest.min_support_version = Some(300);
        let check = resolve_update(200, Some(&latest));
        assert!(!check.has_update);
        assert!(!check.is_force_update);
    }

    #[test]
    fn update_monotonic_in_current_version() {
        let latest = row("android", 200);
        for (older, newer) in [(50, 100), (100, 150), (150, 199)] {
            let newer_check = resolve_update(newer, Some(&latest));
            let older_check = resolve_update(older, Some(&latest));
            if newer_check.has_update {
                assert!(older_check.has_update);
            }
        }
    }

    #[test]
    fn pick_latest_takes_greatest_code() {
        let rows = vec![row("android", 100), row("all", 200), row("android", 150)];
        assert_eq!(pick_latest(&rows).unwrap().version_code, 200);
        assert!(pick_latest(&[]).is_none());
    }

    #[test]
    fn pick_latest_skips_inactive_and_deleted_rows() {
        let mut inactive = row("android", 300);
        inactive.is_active = false;
        let mut deleted = row("all", 200);
        deleted.is_delete = true;

        let rows = vec![row("android", 100), inactive, deleted];
        assert_eq!(pick_latest(&rows).unwrap().version_code, 100);

        let mut only = row("ios", 400);
        only.is_active = false;
        assert!(pick_latest(std::slice::from_ref(&only)).is_none());
    }

    #[test]
    fn pick_latest_tie_keeps_first_row() {
        // Cross-scope tie at the same version_code: the first row in query
        // order wins.
        let rows = vec![row("android", 200), row("all", 200)];
        assert_eq!(pick_latest(&rows).unwrap().platform, "android");
    }
}
