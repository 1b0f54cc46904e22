use actix_identity::Identity;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppData;
use crate::models::Role;
use crate::reports;
use crate::security::ensure_role;

use super::errors::ServiceResult;
use super::pages::{escape_html, notice_block, page, redirect_with_error, NoticeQuery};

pub async fn admin_dashboard(ctx: web::Data<AppData>, identity: Identity, query: web::Query<NoticeQuery>) -> ServiceResult<HttpResponse> {
    ensure_role(&ctx, &identity, Role::Admin)?;

    let stats = reports::dashboard_stats(&ctx)?;

    let body = format!(r#"{}
<h1>Admin dashboard</h1>
<ul>
  <li>Total users: {}</li>
  <li>Total production: {}</li>
  <li>Total deliveries: {}</li>
</ul>
<a href="/admin/production">Production</a> <a href="/admin/deliveries">Deliveries</a>
<a href="/profile">Profile</a> <a href="/logout">Log out</a>"#,
        notice_block(&query), stats.total_users, stats.total_production, stats.total_deliveries);
    Ok(page("Admin dashboard", body.as_str()))
}

// serde_urlencoded cannot flatten, so the notice fields are repeated here
#[derive(Deserialize)]
pub struct BreakdownQuery {
    date: Option<String>,
    notice: Option<String>,
    error: Option<String>,
}

pub async fn admin_deliveries(ctx: web::Data<AppData>, identity: Identity, query: web::Query<BreakdownQuery>) -> ServiceResult<HttpResponse> {
    ensure_role(&ctx, &identity, Role::Admin)?;

    // No date picked means no breakdown, there is no implicit default day
    let picked_date = query.date.as_ref().map(|x| x.trim()).filter(|x| !x.is_empty());
    let breakdown = match picked_date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => reports::delivery_breakdown(&ctx, date)?,
            Err(_) => return Ok(redirect_with_error("/admin/deliveries", "Enter a valid date.")),
        },
        None => Vec::new(),
    };

    let mut breakdown_rows = String::new();
    for row in &breakdown {
        breakdown_rows.push_str(format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape_html(row.name.as_str()), row.liters
        ).as_str());
    }

    let recent = reports::recent_deliveries(&ctx)?;
    let mut recent_rows = String::new();
    for row in &recent {
        recent_rows.push_str(format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.date, escape_html(row.name.as_str()), row.liters
        ).as_str());
    }

    let body = format!(r#"{}
<h1>Deliveries</h1>
<form method="get" action="/admin/deliveries">
  <input name="date" type="date" value="{}">
  <button type="submit">Show breakdown</button>
</form>
<h2>Breakdown</h2>
<table><tr><th>Name</th><th>Liters</th></tr>{}</table>
<h2>Recent deliveries</h2>
<table><tr><th>Date</th><th>Name</th><th>Liters</th></tr>{}</table>
<a href="/admin">Dashboard</a> <a href="/logout">Log out</a>"#,
        notice_block(&NoticeQuery {
            notice: query.notice.clone(),
            error: query.error.clone(),
        }),
        escape_html(picked_date.unwrap_or("")),
        breakdown_rows, recent_rows);
    Ok(page("Deliveries", body.as_str()))
}
