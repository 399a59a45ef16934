use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use std::str::FromStr;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::MaybeUser;
use crate::models::version::{
    AppVersionForm, AppVersionResponse, Platform, VersionCheck, VersionCheckRequest,
};
use crate::models::{Page, Pagination};
use crate::response;
use crate::services::version::{resolve_update, VersionService};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/check", web::post().to(check_version))
        .route("/latest", web::get().to(latest_version))
        .service(
            web::resource("")
                .route(web::get().to(list_versions))
                .route(web::post().to(create_version)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_version))
                .route(web::put().to(update_version))
                .route(web::delete().to(delete_version)),
        );
}

/// POST /setting/versions/check - the update decision for a client at
/// `version_code` on `platform`.
async fn check_version(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    req: web::Json<VersionCheckRequest>,
) -> AppResult<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::debug!(
        platform = req.platform.as_str(),
        version_code = req.version_code,
        user_id = maybe_user.user_id().unwrap_or("anonymous"),
        "version check"
    );

    let latest = match VersionService::new(&state.db)
        .latest_active(req.platform)
        .await
    {
        Ok(latest) => latest,
        Err(e) => {
            // Storage failure: report a server error but keep the payload
            // parseable with the safe no-update default.
            tracing::error!("version lookup failed: {:?}", e);
            return Ok(response::with_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                Some(VersionCheck::no_update()),
            ));
        }
    };

    let check = resolve_update(req.version_code, latest.as_ref());

    let message = if !check.has_update {
        "Already up to date"
    } else if check.is_force_update {
        "A new version is required"
    } else {
        "A new version is available"
    };

    Ok(response::ok_message(message, check))
}

#[derive(Debug, Deserialize)]
struct LatestQuery {
    platform: Option<String>,
}

/// GET /setting/versions/latest?platform= - full record of the newest active
/// release for the platform, or 404.
async fn latest_version(
    state: web::Data<AppState>,
    query: web::Query<LatestQuery>,
) -> AppResult<HttpResponse> {
    let platform = query
        .platform
        .as_deref()
        .ok_or_else(|| AppError::Validation("missing platform parameter".to_string()))?;
    let platform = Platform::from_str(platform)?;

    let version = VersionService::new(&state.db)
        .latest_active(platform)
        .await?
        .ok_or_else(|| AppError::NotFound("No version found".to_string()))?;

    Ok(response::ok(AppVersionResponse::from(version)))
}

#[derive(Debug, Deserialize)]
struct VersionListQuery {
    platform: Option<Platform>,
    is_active: Option<bool>,
    offset: Option<i64>,
    limit: Option<i64>,
}

/// GET /setting/versions - paginated release list, filterable by platform
/// and active flag.
async fn list_versions(
    state: web::Data<AppState>,
    query: web::Query<VersionListQuery>,
) -> AppResult<HttpResponse> {
    let pagination = Pagination {
        offset: query.offset,
        limit: query.limit,
    };

    let (count, rows) = VersionService::new(&state.db)
        .list(
            query.platform,
            query.is_active,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    let results: Vec<AppVersionResponse> = rows.into_iter().map(AppVersionResponse::from).collect();

    Ok(response::ok(Page::new(count, results)))
}

/// GET /setting/versions/{id}
async fn get_version(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let version = VersionService::new(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    Ok(response::ok(AppVersionResponse::from(version)))
}

/// POST /setting/versions - staff only.
async fn create_version(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    form: web::Json<AppVersionForm>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    form.check()?;

    let version = VersionService::new(&state.db).create(&form).await?;

    Ok(response::created(
        "Version created",
        AppVersionResponse::from(version),
    ))
}

/// PUT /setting/versions/{id} - staff only, whole-row replacement.
async fn update_version(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    path: web::Path<i64>,
    form: web::Json<AppVersionForm>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    form.check()?;

    let version = VersionService::new(&state.db)
        .update(path.into_inner(), &form)
        .await?;

    Ok(response::ok_message(
        "Version updated",
        AppVersionResponse::from(version),
    ))
}

/// DELETE /setting/versions/{id} - staff only, soft delete.
async fn delete_version(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    VersionService::new(&state.db)
        .soft_delete(path.into_inner())
        .await?;

    Ok(response::with_status(
        StatusCode::OK,
        "Version deleted",
        None::<()>,
    ))
}
