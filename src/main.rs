use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{App, HttpServer, middleware};

use milk_ledger_server::*;

fn expect_env_var(name: &str) -> String {
    std::env::var(name).expect(format!("{} must be set", name).as_str())
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let database_url = expect_env_var("DATABASE_URL");
    let cookie_secret_key = expect_env_var("COOKIE_SECRET_KEY");
    let password_secret_key = expect_env_var("PASSWORD_SECRET_KEY");

    // Security-sensitive default, rotate it right after the first deployment
    let admin_default_password = std::env::var("ADMIN_DEFAULT_PASSWORD")
        .unwrap_or_else(|_| "admin123".to_string());

    let data = AppData::new(password_secret_key, database_url);
    let domain: String = std::env::var("DOMAIN").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|x| x.parse().ok())
        .unwrap_or(8080);

    data.setup_migrations().unwrap();
    data.setup_default_admin(admin_default_password.as_str()).unwrap();

    HttpServer::new(move || {
        App::new()
            .data(data.clone())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(cookie_secret_key.as_bytes())
                    .name("auth-cookie")
                    .domain(domain.as_str())
                    .secure(false)))
            // enable logger
            .wrap(middleware::Logger::default())
            .configure(api_service::config)
    })
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
