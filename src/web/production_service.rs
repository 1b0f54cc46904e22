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

pub async fn production_page(ctx: web::Data<AppData>, identity: Identity, query: web::Query<NoticeQuery>) -> ServiceResult<HttpResponse> {
    ensure_role(&ctx, &identity, Role::Admin)?;

    let productions = ledger::list_productions(&ctx)?;

    let mut rows = String::new();
    for p in &productions {
        rows.push_str(format!(
            r#"<tr><td>{}</td><td>{}</td><td><form method="post" action="/admin/production/{}/delete"><button type="submit">Delete</button></form></td></tr>"#,
            p.date, p.total_liters, p.id
        ).as_str());
    }

    let body = format!(r#"{}
<h1>Production</h1>
<form method="post" action="/admin/production">
  <input name="date" type="date" value="{}">
  <input name="total_liters" placeholder="Total liters">
  <button type="submit">Save</button>
</form>
<table><tr><th>Date</th><th>Total liters</th><th></th></tr>{}</table>
<a href="/admin">Dashboard</a> <a href="/logout">Log out</a>"#,
        notice_block(&query), Utc::today().naive_utc(), rows);
    Ok(page("Production", body.as_str()))
}

#[derive(Deserialize)]
pub struct ProductionForm {
    date: String,
    total_liters: String,
}

pub async fn record_production(ctx: web::Data<AppData>, identity: Identity, form: web::Form<ProductionForm>) -> ServiceResult<HttpResponse> {
    ensure_role(&ctx, &identity, Role::Admin)?;

    let date = match NaiveDate::parse_from_str(form.date.as_str(), "%Y-%m-%d") {
        Ok(x) => x,
        Err(_) => return Ok(redirect_with_error("/admin/production", "Enter a valid date.")),
    };

    let total_liters = match ledger::parse_liters(form.total_liters.as_str()) {
        Ok(x) => x,
        Err(ServiceError::Validation(_)) => {
            return Ok(redirect_with_error("/admin/production", "Enter valid liters."));
        },
        Err(x) => return Err(x),
    };

    ledger::record_production(&ctx, date, total_liters)?;
    Ok(redirect_with_notice("/admin/production", "Production updated."))
}

pub async fn delete_production(ctx: web::Data<AppData>, identity: Identity, production_id: web::Path<IdType>) -> ServiceResult<HttpResponse> {
    ensure_role(&ctx, &identity, Role::Admin)?;

    ledger::delete_production(&ctx, *production_id)?;
    Ok(redirect_with_notice("/admin/production", "Deleted."))
}
