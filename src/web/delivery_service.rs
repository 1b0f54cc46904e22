use actix_identity::Identity;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::AppData;
use crate::ledger;
use crate::models::{IdType, Role};
use crate::security::ensure_role;

use super::errors::{ServiceError, ServiceResult};
use super::pages::{notice_block, page, redirect_with_error, redirect_with_notice, NoticeQuery};

pub async fn user_dashboard(ctx: web::Data<AppData>, identity: Identity, query: web::Query<NoticeQuery>) -> ServiceResult<HttpResponse> {
    let user = ensure_role(&ctx, &identity, Role::User)?;

    let deliveries = ledger::list_deliveries_for_user(&ctx, user.id)?;

    let mut rows = String::new();
    for d in &deliveries {
        rows.push_str(format!(
            r#"<tr><td>{}</td><td>{}</td><td><form method="post" action="/user/delivery/{}/delete"><button type="submit">Delete</button></form></td></tr>"#,
            d.date, d.liters, d.id
        ).as_str());
    }

    let body = format!(r#"{}
<h1>My deliveries</h1>
<form method="post" action="/user/delivery">
  <input name="date" type="date" value="{}">
  <input name="liters" placeholder="Liters">
  <button type="submit">Save</button>
</form>
<table><tr><th>Date</th><th>Liters</th><th></th></tr>{}</table>
<a href="/profile">Profile</a> <a href="/logout">Log out</a>"#,
        notice_block(&query), Utc::today().naive_utc(), rows);
    Ok(page("My deliveries", body.as_str()))
}

#[derive(Deserialize)]
pub struct DeliveryForm {
    date: String,
    liters: String,
}

pub async fn add_delivery(ctx: web::Data<AppData>, identity: Identity, form: web::Form<DeliveryForm>) -> ServiceResult<HttpResponse> {
    let user = ensure_role(&ctx, &identity, Role::User)?;

    let date = match NaiveDate::parse_from_str(form.date.as_str(), "%Y-%m-%d") {
        Ok(x) => x,
        Err(_) => return Ok(redirect_with_error("/user/dashboard", "Enter a valid date.")),
    };

    let liters = match ledger::parse_liters(form.liters.as_str()) {
        Ok(x) => x,
        Err(ServiceError::Validation(_)) => {
            return Ok(redirect_with_error("/user/dashboard", "Enter valid liters."));
        },
        Err(x) => return Err(x),
    };

    ledger::record_delivery(&ctx, user.id, date, liters)?;
    Ok(redirect_with_notice("/user/dashboard", "Delivery updated."))
}

pub async fn delete_delivery(ctx: web::Data<AppData>, identity: Identity, delivery_id: web::Path<IdType>) -> ServiceResult<HttpResponse> {
    let user = ensure_role(&ctx, &identity, Role::User)?;

    ledger::delete_delivery(&ctx, *delivery_id, user.id)?;
    Ok(redirect_with_notice("/user/dashboard", "Deleted."))
}
