use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use diesel::{PgConnection, r2d2::ConnectionManager};

use super::schema::*;

// type alias to use in multiple places
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type IdType = i32;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn from_str(name: &str) -> Option<Role> {
        match name {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Queryable, Insertable)]
#[table_name = "users"]
pub struct User {
    pub id: IdType,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub last_password_change: NaiveDateTime,
    pub role: String,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_str(self.role.as_str()).unwrap_or(Role::User)
    }
}

#[derive(Debug, Queryable, Insertable)]
#[table_name = "deliveries"]
pub struct Delivery {
    pub id: IdType,
    pub user_id: IdType,
    pub date: NaiveDate,
    pub liters: f64,
}

#[derive(Debug, Queryable, Insertable)]
#[table_name = "productions"]
pub struct Production {
    pub id: IdType,
    pub date: NaiveDate,
    pub total_liters: f64,
}
