use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::user::{UpdateUserRequest, User};
use crate::utils::password::hash_password;
use crate::utils::time::now_timestamp;

const USER_COLUMNS: &str = r#"
    id, username, password, name, gender, mobile, email, avatar_url,
    is_active, is_staff, last_login,
    create_time, update_time, is_delete, delete_time
"#;

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        UserService { db }
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = $1 AND is_delete = FALSE"#
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    /// Look up a user by login identifier: the username column first, the
    /// mobile column as a fallback.
    pub async fn get_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM "user"
            WHERE (username = $1 OR mobile = $1) AND is_delete = FALSE
            "#
        ))
        .bind(identifier)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user" WHERE is_delete = FALSE"#)
                .fetch_one(&self.db.pool)
                .await?;

        Ok(count)
    }

    pub async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM "user"
            WHERE is_delete = FALSE
            ORDER BY create_time DESC
            OFFSET $1 LIMIT $2
            "#
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(users)
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_staff: bool,
    ) -> AppResult<User> {
        if self.get_by_identifier(username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "user `{}` already exists",
                username
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;
        let now = now_timestamp();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO "user" (id, username, password, gender, is_active, is_staff,
                                create_time, update_time)
            VALUES ($1, $2, $3, 'unknown', TRUE, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(username)
        .bind(&password_hash)
        .bind(is_staff)
        .bind(now)
        .fetch_one(&self.db.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_profile(&self, id: &str, form: &UpdateUserRequest) -> AppResult<User> {
        let now = now_timestamp();
        let gender = form.gender.map(|g| g.as_str());

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE "user"
            SET name = COALESCE($2, name),
                gender = COALESCE($3, gender),
                mobile = COALESCE($4, mobile),
                email = COALESCE($5, email),
                avatar_url = COALESCE($6, avatar_url),
                update_time = $7
            WHERE id = $1 AND is_delete = FALSE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(form.name.as_deref())
        .bind(gender)
        .bind(form.mobile.as_deref())
        .bind(form.email.as_deref())
        .bind(form.avatar_url.as_deref())
        .bind(now)
        .fetch_optional(&self.db.pool)
        .await?;

        user.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_last_login(&self, id: &str) -> AppResult<()> {
        sqlx::query(r#"UPDATE "user" SET last_login = $1 WHERE id = $2"#)
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}
