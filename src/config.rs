use anyhow::Context;

/// Server configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret_key: String,
    pub jwt_expires_in: String,
    pub jwt_refresh_expires_in: String,
    pub cors_allow_origin: String,
    /// Optional bootstrap admin account, created at startup when no user
    /// with that name exists yet.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret_key =
            std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;

        let jwt_expires_in = std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "1d".to_string());
        let jwt_refresh_expires_in =
            std::env::var("JWT_REFRESH_EXPIRES_IN").unwrap_or_else(|_| "7d".to_string());

        let cors_allow_origin =
            std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string());

        let admin_username = std::env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Config {
            host,
            port,
            database_url,
            jwt_secret_key,
            jwt_expires_in,
            jwt_refresh_expires_in,
            cors_allow_origin,
            admin_username,
            admin_password,
        })
    }
}
