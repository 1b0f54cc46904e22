#[macro_use]
extern crate diesel;
extern crate dotenv;

#[macro_use]
extern crate diesel_migrations;

use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;

use crate::web::errors::ServiceResult;

pub mod api_service;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod schema;
pub mod security;
pub mod web;

embed_migrations!();

#[derive(Clone)]
pub struct AppData {
    pub pool: models::Pool,
    pub accounts: security::Accounts,
}

impl AppData {
    pub fn new(password_secret_key: String, database_url: String) -> Self {
        let pool = {
            let manager = ConnectionManager::<PgConnection>::new(database_url);
            r2d2::Pool::builder()
                .build(manager)
                .expect("Failed to create pool")
        };

        AppData {
            pool,
            accounts: security::Accounts::new(password_secret_key),
        }
    }

    pub fn setup_migrations(&self) -> ServiceResult<()> {
        let conn = self.pool.get()?;
        embedded_migrations::run(&conn).unwrap();
        Ok(())
    }

    /// Seeds the sentinel admin account, a no-op when it already exists.
    pub fn setup_default_admin(&self, password: &str) -> ServiceResult<()> {
        self.accounts.bootstrap_default_admin(self, password)
    }
}
