use actix_web::web;

use crate::handlers::system::health_check;

mod admin;
mod contact;
mod form_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.configure(contact::config_routes)
        .configure(admin::config_routes);

    cfg.configure(form_error::config_routes);
}
