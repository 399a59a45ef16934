use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::MaybeUser;
use crate::models::dynamic_config::{ConfigType, DynamicConfigForm, DynamicConfigResponse};
use crate::models::{Page, Pagination};
use crate::response;
use crate::services::DynamicConfigService;
use crate::utils::time::now_timestamp;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/active", web::get().to(active_configs))
        .service(
            web::resource("")
                .route(web::get().to(list_configs))
                .route(web::post().to(create_config)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_config))
                .route(web::put().to(update_config))
                .route(web::delete().to(delete_config)),
        );
}

#[derive(Debug, Deserialize)]
struct ConfigListQuery {
    config_type: Option<ConfigType>,
    is_active: Option<bool>,
    offset: Option<i64>,
    limit: Option<i64>,
}

/// GET /setting/configs - paginated content blocks, ordered by sort_order.
/// `is_valid` is computed against one `now` for the whole page.
async fn list_configs(
    state: web::Data<AppState>,
    query: web::Query<ConfigListQuery>,
) -> AppResult<HttpResponse> {
    let pagination = Pagination {
        offset: query.offset,
        limit: query.limit,
    };

    let (count, rows) = DynamicConfigService::new(&state.db)
        .list(
            query.config_type,
            query.is_active,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    let now = now_timestamp();
    let results: Vec<DynamicConfigResponse> = rows
        .into_iter()
        .map(|c| DynamicConfigResponse::from_config_at(c, now))
        .collect();

    Ok(response::ok(Page::new(count, results)))
}

#[derive(Debug, Deserialize)]
struct ActiveQuery {
    config_type: Option<ConfigType>,
}

/// GET /setting/configs/active - active blocks currently inside their
/// validity window; what a client renders right now.
async fn active_configs(
    state: web::Data<AppState>,
    query: web::Query<ActiveQuery>,
) -> AppResult<HttpResponse> {
    let rows = DynamicConfigService::new(&state.db)
        .list_active(query.config_type)
        .await?;

    let now = now_timestamp();
    let results: Vec<DynamicConfigResponse> = rows
        .into_iter()
        .filter(|c| c.is_valid_at(now))
        .map(|c| DynamicConfigResponse::from_config_at(c, now))
        .collect();

    Ok(response::ok(results))
}

/// GET /setting/configs/{id}
async fn get_config(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let config = DynamicConfigService::new(&state.db)
        .get(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Config not found".to_string()))?;

    Ok(response::ok(DynamicConfigResponse::from_config_at(
        config,
        now_timestamp(),
    )))
}

/// POST /setting/configs - staff only.
async fn create_config(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    form: web::Json<DynamicConfigForm>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    form.check()?;

    let config = DynamicConfigService::new(&state.db).create(&form).await?;

    Ok(response::created(
        "Config created",
        DynamicConfigResponse::from_config_at(config, now_timestamp()),
    ))
}

/// PUT /setting/configs/{id} - staff only, whole-row replacement.
async fn update_config(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    path: web::Path<i64>,
    form: web::Json<DynamicConfigForm>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    form.check()?;

    let config = DynamicConfigService::new(&state.db)
        .update(path.into_inner(), &form)
        .await?;

    Ok(response::ok_message(
        "Config updated",
        DynamicConfigResponse::from_config_at(config, now_timestamp()),
    ))
}

/// DELETE /setting/configs/{id} - staff only, soft delete.
async fn delete_config(
    state: web::Data<AppState>,
    maybe_user: MaybeUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    maybe_user.require_staff()?;

    DynamicConfigService::new(&state.db)
        .soft_delete(path.into_inner())
        .await?;

    Ok(response::with_status(
        StatusCode::OK,
        "Config deleted",
        None::<()>,
    ))
}
