use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{AdminMiddleware, AuthMiddleware, AuthUser};
use crate::models::user::{
    LoginRequest, LoginResponse, RefreshRequest, TokenPairResponse, TokenType, UpdateUserRequest,
    UserResponse,
};
use crate::models::{Page, Pagination};
use crate::response;
use crate::services::UserService;
use crate::utils::auth::{create_token, verify_token};
use crate::utils::password::verify_password;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/refresh_token", web::post().to(refresh_token))
        .service(
            web::resource("/me")
                .wrap(AuthMiddleware)
                .route(web::get().to(me)),
        )
        .service(
            web::resource("")
                .wrap(AdminMiddleware)
                .route(web::get().to(list_users)),
        )
        .service(
            web::resource("/{id}")
                .wrap(AuthMiddleware)
                .route(web::get().to(get_user))
                .route(web::put().to(update_user)),
        );
}

/// POST /user/login - username-or-mobile plus password, returns the profile
/// with a fresh access/refresh token pair.
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> AppResult<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_service = UserService::new(&state.db);

    let user = user_service
        .get_by_identifier(&req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    user_service.update_last_login(&user.id).await?;

    let access = create_token(
        &user.id,
        TokenType::Access,
        &state.config.jwt_secret_key,
        &state.config.jwt_expires_in,
    )?;
    let refresh = create_token(
        &user.id,
        TokenType::Refresh,
        &state.config.jwt_secret_key,
        &state.config.jwt_refresh_expires_in,
    )?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(response::ok_message(
        "Login successful",
        LoginResponse::new(user, access, refresh),
    ))
}

/// POST /user/refresh_token - validate and rotate a refresh token. An
/// invalid or expired token is a 401, never a silent anonymous downgrade.
async fn refresh_token(
    state: web::Data<AppState>,
    req: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let claims = verify_token(
        &req.refresh,
        &state.config.jwt_secret_key,
        TokenType::Refresh,
    )
    .map_err(|e| {
        tracing::debug!("Refresh token rejected: {:?}", e);
        AppError::Unauthorized("Invalid or expired refresh token".to_string())
    })?;

    // The subject must still be a live, active account.
    let user = UserService::new(&state.db)
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    let access = create_token(
        &user.id,
        TokenType::Access,
        &state.config.jwt_secret_key,
        &state.config.jwt_expires_in,
    )?;
    let refresh = create_token(
        &user.id,
        TokenType::Refresh,
        &state.config.jwt_secret_key,
        &state.config.jwt_refresh_expires_in,
    )?;

    Ok(response::ok_message(
        "Token refreshed",
        TokenPairResponse { access, refresh },
    ))
}

/// GET /user/me - current profile.
async fn me(auth_user: AuthUser) -> AppResult<HttpResponse> {
    Ok(response::ok(UserResponse::from(auth_user.user)))
}

/// GET /user - paginated user list, staff only.
async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<Pagination>,
) -> AppResult<HttpResponse> {
    let user_service = UserService::new(&state.db);

    let count = user_service.count().await?;
    let users = user_service.list(query.offset(), query.limit()).await?;

    let results: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(response::ok(Page::new(count, results)))
}

/// GET /user/{id} - profile by id, any authenticated caller.
async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let user = UserService::new(&state.db)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(response::ok(UserResponse::from(user)))
}

/// PUT /user/{id} - profile update; callers may edit themselves, staff may
/// edit anyone.
async fn update_user(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    path: web::Path<String>,
    form: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if auth_user.user.id != id && !auth_user.user.is_staff {
        return Err(AppError::Forbidden(
            "Cannot update another user's profile".to_string(),
        ));
    }

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = UserService::new(&state.db)
        .update_profile(&id, &form)
        .await?;

    Ok(response::ok_message(
        "User updated",
        UserResponse::from(user),
    ))
}
