use actix_identity::Identity;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::AppData;
use crate::models::Role;
use crate::security::{parse_user, parse_user_required};

use super::errors::{ServiceError, ServiceResult};
use super::pages::{escape_html, notice_block, page, redirect_to, redirect_with_error, redirect_with_notice, NoticeQuery};

pub async fn home(ctx: web::Data<AppData>, identity: Identity) -> ServiceResult<HttpResponse> {
    Ok(match parse_user(&ctx, &identity)? {
        Some(user) => match user.role() {
            Role::Admin => redirect_to("/admin"),
            Role::User => redirect_to("/user/dashboard"),
        },
        None => redirect_to("/login"),
    })
}

pub async fn register_page(query: web::Query<NoticeQuery>) -> HttpResponse {
    let body = format!(r#"{}
<h1>Register</h1>
<form method="post" action="/register">
  <input name="name" placeholder="Name">
  <input name="email" placeholder="Email">
  <input name="password" type="password" placeholder="Password">
  <select name="role"><option value="user">User</option><option value="admin">Admin</option></select>
  <button type="submit">Register</button>
</form>
<a href="/login">Log in</a>"#, notice_block(&query));
    page("Register", body.as_str())
}

#[derive(Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
    role: String,
}

pub async fn register(ctx: web::Data<AppData>, form: web::Form<RegisterForm>) -> ServiceResult<HttpResponse> {
    let res = ctx.accounts.register(
        &ctx,
        form.name.as_str(),
        form.email.as_str(),
        form.password.as_str(),
        form.role.as_str(),
    );

    Ok(match res {
        Ok(_) => redirect_with_notice("/login", "Account created. Please log in."),
        Err(ServiceError::Validation(_)) => redirect_with_error("/register", "Please fill all fields correctly."),
        Err(ServiceError::AlreadyPresent(_)) => redirect_with_error("/register", "Email already registered."),
        Err(x) => return Err(x),
    })
}

pub async fn login_page(query: web::Query<NoticeQuery>) -> HttpResponse {
    let body = format!(r#"{}
<h1>Login</h1>
<form method="post" action="/login">
  <input name="email" placeholder="Email">
  <input name="password" type="password" placeholder="Password">
  <button type="submit">Log in</button>
</form>
<a href="/register">Register</a>"#, notice_block(&query));
    page("Login", body.as_str())
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn login(ctx: web::Data<AppData>, identity: Identity, form: web::Form<LoginForm>) -> ServiceResult<HttpResponse> {
    match ctx.accounts.authenticate(&ctx, form.email.as_str(), form.password.as_str()) {
        Ok(user) => {
            identity.remember(ctx.accounts.save_identity(&user));
            Ok(redirect_with_notice("/", "Login successful!"))
        },
        Err(ServiceError::InvalidCredentials) => {
            Ok(redirect_with_error("/login", "Invalid email or password."))
        },
        Err(x) => Err(x),
    }
}

pub async fn logout(identity: Identity) -> HttpResponse {
    identity.forget();
    redirect_with_notice("/login", "Logged out.")
}

pub async fn profile_page(ctx: web::Data<AppData>, identity: Identity, query: web::Query<NoticeQuery>) -> ServiceResult<HttpResponse> {
    let user = parse_user_required(&ctx, &identity)?;

    let body = format!(r#"{}
<h1>Profile</h1>
<form method="post" action="/profile">
  <input name="name" value="{}">
  <input name="email" value="{}">
  <input name="new_password" type="password" placeholder="New password">
  <input name="confirm_password" type="password" placeholder="Confirm password">
  <button type="submit">Update</button>
</form>
<a href="/">Home</a> <a href="/logout">Log out</a>"#,
        notice_block(&query), escape_html(user.name.as_str()), escape_html(user.email.as_str()));
    Ok(page("Profile", body.as_str()))
}

#[derive(Deserialize)]
pub struct ProfileForm {
    name: String,
    email: String,
    new_password: Option<String>,
    confirm_password: Option<String>,
}

pub async fn update_profile(ctx: web::Data<AppData>, identity: Identity, form: web::Form<ProfileForm>) -> ServiceResult<HttpResponse> {
    let user = parse_user_required(&ctx, &identity)?;

    // An empty password field means "keep the current password"
    let new_password = match form.new_password.as_ref().map(String::as_str) {
        Some(password) if !password.is_empty() => {
            Some((password, form.confirm_password.as_ref().map(String::as_str).unwrap_or("")))
        },
        _ => None,
    };

    let res = ctx.accounts.update_profile(
        &ctx,
        user.id,
        form.name.as_str(),
        form.email.as_str(),
        new_password,
    );

    Ok(match res {
        Ok(updated) => {
            // The cookie embeds the password timestamp, refresh it so the
            // session survives a password change
            identity.remember(ctx.accounts.save_identity(&updated));
            redirect_with_notice("/profile", "Profile updated.")
        },
        Err(ServiceError::Validation(x)) => redirect_with_error("/profile", x.as_str()),
        Err(ServiceError::AlreadyPresent(_)) => redirect_with_error("/profile", "Email already exists."),
        Err(x) => return Err(x),
    })
}
