use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::dynamic_config::{ConfigType, DynamicConfig, DynamicConfigForm};
use crate::utils::time::now_timestamp;

const CONFIG_COLUMNS: &str = r#"
    id, config_type, title, sort_order, start_time, end_time, is_active,
    extra_data, create_time, update_time, is_delete, delete_time
"#;

pub struct DynamicConfigService<'a> {
    db: &'a Database,
}

impl<'a> DynamicConfigService<'a> {
    pub fn new(db: &'a Database) -> Self {
        DynamicConfigService { db }
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<DynamicConfig>> {
        let result = sqlx::query_as::<_, DynamicConfig>(&format!(
            r#"SELECT {CONFIG_COLUMNS} FROM dynamic_config WHERE id = $1 AND is_delete = FALSE"#
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn list(
        &self,
        config_type: Option<ConfigType>,
        is_active: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(i64, Vec<DynamicConfig>)> {
        let config_type = config_type.map(|t| t.as_str());

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM dynamic_config
            WHERE is_delete = FALSE
              AND ($1::text IS NULL OR config_type = $1)
              AND ($2::bool IS NULL OR is_active = $2)
            "#,
        )
        .bind(config_type)
        .bind(is_active)
        .fetch_one(&self.db.pool)
        .await?;

        let rows = sqlx::query_as::<_, DynamicConfig>(&format!(
            r#"
            SELECT {CONFIG_COLUMNS} FROM dynamic_config
            WHERE is_delete = FALSE
              AND ($1::text IS NULL OR config_type = $1)
              AND ($2::bool IS NULL OR is_active = $2)
            ORDER BY sort_order ASC, create_time DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(config_type)
        .bind(is_active)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;

        Ok((count, rows))
    }

    /// Active rows in display order. The caller applies the validity window;
    /// time-based filtering stays out of SQL so it is computed from one
    /// consistent `now` per request.
    pub async fn list_active(&self, config_type: Option<ConfigType>) -> AppResult<Vec<DynamicConfig>> {
        let config_type = config_type.map(|t| t.as_str());

        let rows = sqlx::query_as::<_, DynamicConfig>(&format!(
            r#"
            SELECT {CONFIG_COLUMNS} FROM dynamic_config
            WHERE is_delete = FALSE AND is_active = TRUE
              AND ($1::text IS NULL OR config_type = $1)
            ORDER BY sort_order ASC, create_time DESC
            "#
        ))
        .bind(config_type)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create(&self, form: &DynamicConfigForm) -> AppResult<DynamicConfig> {
        let now = now_timestamp();
        let config = sqlx::query_as::<_, DynamicConfig>(&format!(
            r#"
            INSERT INTO dynamic_config (config_type, title, sort_order, start_time, end_time,
                                        is_active, extra_data, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(form.config_type.as_str())
        .bind(&form.title)
        .bind(form.sort_order)
        .bind(form.start_time)
        .bind(form.end_time)
        .bind(form.is_active)
        .bind(form.extra_data_or_default())
        .bind(now)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(config)
    }

    /// Whole-row replacement; concurrent writers resolve by last-write-wins.
    pub async fn update(&self, id: i64, form: &DynamicConfigForm) -> AppResult<DynamicConfig> {
        let now = now_timestamp();
        let config = sqlx::query_as::<_, DynamicConfig>(&format!(
            r#"
            UPDATE dynamic_config
            SET config_type = $2, title = $3, sort_order = $4, start_time = $5,
                end_time = $6, is_active = $7, extra_data = $8, update_time = $9
            WHERE id = $1 AND is_delete = FALSE
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(form.config_type.as_str())
        .bind(&form.title)
        .bind(form.sort_order)
        .bind(form.start_time)
        .bind(form.end_time)
        .bind(form.is_active)
        .bind(form.extra_data_or_default())
        .bind(now)
        .fetch_optional(&self.db.pool)
        .await?;

        config.ok_or_else(|| AppError::NotFound("Config not found".to_string()))
    }

    pub async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            UPDATE dynamic_config
            SET is_delete = TRUE, delete_time = $2, update_time = $2
            WHERE id = $1 AND is_delete = FALSE
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Config not found".to_string()));
        }
        Ok(())
    }
}
