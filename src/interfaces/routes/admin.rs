use actix_web::web;

use crate::handlers::login::admin_login;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_login)
    );
}
