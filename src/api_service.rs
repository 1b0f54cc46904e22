use actix_web::web;

use crate::web::auth_service::{home, login, login_page, logout, profile_page, register, register_page, update_profile};
use crate::web::delivery_service::{add_delivery, delete_delivery, user_dashboard};
use crate::web::production_service::{delete_production, production_page, record_production};
use crate::web::report_service::{admin_dashboard, admin_deliveries};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(
            web::resource("/register")
                .route(web::get().to(register_page))
                .route(web::post().to(register))
        )
        .service(
            web::resource("/login")
                .route(web::get().to(login_page))
                .route(web::post().to(login))
        )
        .service(web::resource("/logout").route(web::get().to(logout)))
        .service(
            web::resource("/profile")
                .route(web::get().to(profile_page))
                .route(web::post().to(update_profile))
        )
        .service(web::resource("/user/dashboard").route(web::get().to(user_dashboard)))
        .service(web::resource("/user/delivery").route(web::post().to(add_delivery)))
        .service(web::resource("/user/delivery/{delivery_id}/delete").route(web::post().to(delete_delivery)))
        .service(web::resource("/admin").route(web::get().to(admin_dashboard)))
        .service(
            web::resource("/admin/production")
                .route(web::get().to(production_page))
                .route(web::post().to(record_production))
        )
        .service(web::resource("/admin/production/{production_id}/delete").route(web::post().to(delete_production)))
        .service(web::resource("/admin/deliveries").route(web::get().to(admin_deliveries)));
}
