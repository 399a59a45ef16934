pub mod configs;
pub mod users;
pub mod versions;

use actix_web::web;

use crate::middleware::OptionalAuthMiddleware;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/user").configure(users::create_routes))
        .service(
            // The setting endpoints are publicly readable; a token is picked
            // up when present and mutation handlers enforce the staff role.
            web::scope("/setting")
                .wrap(OptionalAuthMiddleware)
                .service(web::scope("/versions").configure(versions::create_routes))
                .service(web::scope("/configs").configure(configs::create_routes)),
        );
}
