use actix_identity::Identity;
use argonautica::{Hasher, Verifier};
use chrono::{prelude::*, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::AppData;
use crate::models::{IdType, Role, User};
use crate::schema::users;
use crate::web::errors::{ServiceError, ServiceResult};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@milk.local";
pub const DEFAULT_ADMIN_NAME: &str = "Admin";

pub fn hash_password(secret_key: &str, password: &str) -> Result<String, ServiceError> {
    Hasher::default()
        .with_password(password)
        .with_secret_key(secret_key)
        .hash()
        .map_err(|err| ServiceError::InternalServerError(format!("Hashing error: {}", err)))
}

pub fn verify_hash(secret_key: &str, hash: &str, password: &str) -> bool {
    Verifier::default()
        .with_hash(hash)
        .with_password(password)
        .with_secret_key(secret_key)
        .verify()
        .unwrap_or(false)
}

/// Emails are matched case-insensitively, the store only ever sees this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Insertable, AsChangeset)]
#[table_name = "users"]
pub struct UserInputDb {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub last_password_change: Option<chrono::NaiveDateTime>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityCookie {
    id: IdType,
    timestamp: NaiveDateTime,
}

#[derive(Clone)]
pub struct Accounts {
    password_secret_key: String,
}

impl Accounts {
    pub fn new(password_secret_key: String) -> Self {
        Accounts {
            password_secret_key
        }
    }

    pub fn register(&self, ctx: &AppData, name: &str, email: &str, password: &str, role: &str) -> ServiceResult<User> {
        use crate::schema::users::dsl;

        let name = name.trim();
        let email = normalize_email(email);
        let role = Role::from_str(role)
            .ok_or_else(|| ServiceError::Validation("unknown role".to_string()))?;
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation("all fields are required".to_string()));
        }

        let password_hash = hash_password(self.password_secret_key.as_str(), password)?;

        let value = UserInputDb {
            name: Some(name.to_string()),
            email: Some(email),
            password_hash: Some(password_hash),
            last_password_change: Some(Utc::now().naive_utc()),
            role: Some(role.as_str().to_string()),
        };

        let conn = ctx.pool.get()?;

        Ok(diesel::insert_into(dsl::users)
            .values(value)
            .get_result(&conn)?)
    }

    fn find_user_by_email(&self, ctx: &AppData, email: &str) -> ServiceResult<Option<User>> {
        use crate::schema::users::dsl;

        let conn = ctx.pool.get()?;
        Ok(dsl::users.filter(dsl::email.eq(normalize_email(email))).first::<User>(&conn).optional()?)
    }

    pub fn find_user_by_id(&self, ctx: &AppData, id: IdType) -> ServiceResult<Option<User>> {
        use crate::schema::users::dsl;

        let conn = ctx.pool.get()?;
        Ok(dsl::users.find(id).first::<User>(&conn).optional()?)
    }

    /// A missing account and a wrong password are indistinguishable to the caller.
    pub fn authenticate(&self, ctx: &AppData, email: &str, password: &str) -> ServiceResult<User> {
        let user = match self.find_user_by_email(ctx, email)? {
            None => return Err(ServiceError::InvalidCredentials),
            Some(u) => u,
        };

        if !verify_hash(self.password_secret_key.as_str(), user.password_hash.as_str(), password) {
            Err(ServiceError::InvalidCredentials)
        } else {
            Ok(user)
        }
    }

    /// Name/email always change together with the optional password, a duplicate
    /// email rolls the whole update back.
    pub fn update_profile(&self, ctx: &AppData, id: IdType, name: &str, email: &str, new_password: Option<(&str, &str)>) -> ServiceResult<User> {
        use crate::schema::users::dsl;

        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() {
            return Err(ServiceError::Validation("name and email are required".to_string()));
        }

        let (new_passw_hash, new_change_time) = match new_password {
            Some((password, confirm)) => {
                if password != confirm {
                    return Err(ServiceError::Validation("passwords do not match".to_string()));
                }
                (
                    Some(hash_password(self.password_secret_key.as_str(), password)?),
                    Some(Utc::now().naive_utc())
                )
            },
            None => (None, None),
        };

        let data = UserInputDb {
            name: Some(name.to_string()),
            email: Some(email),
            password_hash: new_passw_hash,
            last_password_change: new_change_time,
            role: None,
        };

        let conn = ctx.pool.get()?;

        Ok(diesel::update(dsl::users.find(id))
            .set(&data)
            .get_result(&conn)?)
    }

    /// Safe to run on every process start.
    pub fn bootstrap_default_admin(&self, ctx: &AppData, password: &str) -> ServiceResult<()> {
        use crate::schema::users::dsl;

        let conn = ctx.pool.get()?;

        let existing = dsl::users
            .filter(dsl::email.eq(DEFAULT_ADMIN_EMAIL))
            .first::<User>(&conn)
            .optional()?;

        std::mem::drop(conn);

        match existing {
            None => {
                match self.register(ctx, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_EMAIL, password, Role::Admin.as_str()) {
                    Ok(_) => log::info!("Default admin created: {}", DEFAULT_ADMIN_EMAIL),
                    // Another process may have seeded it between the check and the insert
                    Err(ServiceError::AlreadyPresent(_)) => log::info!("Default admin already exists."),
                    Err(x) => return Err(x),
                }
            },
            Some(_) => {
                log::info!("Default admin already exists.");
            },
        }

        Ok(())
    }

    pub fn save_identity(&self, user: &User) -> String {
        serde_json::to_string(&IdentityCookie {
            id: user.id,
            timestamp: user.last_password_change,
        }).unwrap()
    }

    pub fn parse_identity(&self, ctx: &AppData, identity: &str) -> ServiceResult<Option<User>> {
        let cookie: Option<IdentityCookie> = serde_json::from_str(identity).ok();
        let cookie = match cookie {
            Some(x) => x,
            None => return Ok(None),
        };

        let user = match self.find_user_by_id(ctx, cookie.id)? {
            None => return Ok(None),
            Some(u) => u,
        };
        // A password change invalidates every session issued before it
        if user.last_password_change > cookie.timestamp {
            Ok(None)
        } else {
            Ok(Some(user))
        }
    }
}

/// Resolves the request identity, a missing or stale cookie is just anonymous.
pub fn parse_user(ctx: &AppData, identity: &Identity) -> ServiceResult<Option<User>> {
    match identity.identity() {
        Some(x) => ctx.accounts.parse_identity(ctx, x.as_str()),
        None => Ok(None),
    }
}

/// As `parse_user`, but anonymous callers are turned away to login.
pub fn parse_user_required(ctx: &AppData, identity: &Identity) -> ServiceResult<User> {
    parse_user(ctx, identity)?.ok_or(ServiceError::LoginRequired)
}

/// Authentication is always checked before the role, an anonymous caller
/// never learns whether a role-gated resource exists.
pub fn ensure_role(ctx: &AppData, identity: &Identity, role: Role) -> ServiceResult<User> {
    let user = parse_user_required(ctx, identity)?;
    user.ensure_role(role)?;
    Ok(user)
}

pub trait RoleCheckable {
    fn ensure_role(&self, role: Role) -> ServiceResult<()>;

    fn ensure_admin(&self) -> ServiceResult<()>;
}

impl RoleCheckable for User {
    fn ensure_role(&self, role: Role) -> ServiceResult<()> {
        if self.role() != role {
            Err(ServiceError::Unauthorized)
        } else {
            Ok(())
        }
    }

    fn ensure_admin(&self) -> ServiceResult<()> {
        self.ensure_role(Role::Admin)
    }
}
