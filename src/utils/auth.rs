use crate::error::{AppError, AppResult};
use crate::models::user::{Claims, TokenType};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// Issue a JWT of the given type. `expires_in` uses the `30m` / `12h` / `7d`
/// shorthand; a bare number is read as hours.
pub fn create_token(
    user_id: &str,
    token_type: TokenType,
    secret: &str,
    expires_in: &str,
) -> AppResult<String> {
    let expiration = parse_duration(expires_in)?;
    let now = Utc::now();
    let exp = now
        .checked_add_signed(expiration)
        .ok_or_else(|| AppError::InternalServerError("Invalid expiration time".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now.timestamp(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Decode and validate a JWT, additionally requiring the expected token type.
/// An access token is never accepted where a refresh token is required, and
/// vice versa.
pub fn verify_token(token: &str, secret: &str, expected: TokenType) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    if token_data.claims.token_type != expected {
        return Err(AppError::Unauthorized(format!(
            "Expected {} token",
            expected.as_str()
        )));
    }

    Ok(token_data.claims)
}

pub fn parse_duration(duration_str: &str) -> AppResult<Duration> {
    let duration_str = duration_str.trim();

    if let Some(hours) = duration_str.strip_suffix('h') {
        let hours: i64 = hours
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))?;
        Ok(Duration::hours(hours))
    } else if let Some(days) = duration_str.strip_suffix('d') {
        let days: i64 = days
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))?;
        Ok(Duration::days(days))
    } else if let Some(minutes) = duration_str.strip_suffix('m') {
        let minutes: i64 = minutes
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))?;
        Ok(Duration::minutes(minutes))
    } else {
        // Default to hours
        let hours: i64 = duration_str
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))?;
        Ok(Duration::hours(hours))
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trip() {
        let token = create_token("user-1", TokenType::Access, SECRET, "1h").unwrap();
        let claims = verify_token(&token, SECRET, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let token = create_token("user-1", TokenType::Refresh, SECRET, "7d").unwrap();
        assert!(verify_token(&token, SECRET, TokenType::Access).is_err());
        assert!(verify_token(&token, SECRET, TokenType::Refresh).is_ok());
    }

    #[test]
    fn expired_token_rejected() {
        // Issued already expired, beyond the default leeway.
        let token = create_token("user-1", TokenType::Access, SECRET, "-1h").unwrap();
        assert!(verify_token(&token, SECRET, TokenType::Access).is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = create_token("user-1", TokenType::Access, SECRET, "1h").unwrap();
        assert!(verify_token(&token, "other-secret", TokenType::Access).is_err());
    }

    #[test]
    fn duration_shorthand() {
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_duration("12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_duration("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("2").unwrap(), Duration::hours(2));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Token abc"), None);
    }
}
