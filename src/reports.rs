use chrono::NaiveDate;
use diesel::prelude::*;

use crate::AppData;
use crate::models::Role;
use crate::web::errors::ServiceResult;

pub const RECENT_DELIVERIES_LIMIT: i64 = 200;

#[derive(Debug, PartialEq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_production: f64,
    pub total_deliveries: i64,
}

pub fn dashboard_stats(ctx: &AppData) -> ServiceResult<DashboardStats> {
    use crate::schema::{deliveries, productions, users};

    let conn = ctx.pool.get()?;

    let total_users: i64 = users::table.count().get_result(&conn)?;
    let total_production: Option<f64> = productions::table
        .select(diesel::dsl::sum(productions::total_liters))
        .get_result(&conn)?;
    let total_deliveries: i64 = deliveries::table.count().get_result(&conn)?;

    Ok(DashboardStats {
        total_users,
        total_production: total_production.unwrap_or(0.0),
        total_deliveries,
    })
}

#[derive(Debug, PartialEq)]
pub struct BreakdownRow {
    pub name: String,
    pub liters: f64,
}

/// One row per "user"-role account for the given day, zero liters for anyone
/// without an entry, ordered by name.
pub fn delivery_breakdown(ctx: &AppData, date: NaiveDate) -> ServiceResult<Vec<BreakdownRow>> {
    use crate::schema::{deliveries, users};

    let conn = ctx.pool.get()?;

    let rows: Vec<(String, Option<f64>)> = users::table
        .left_join(deliveries::table.on(
            deliveries::user_id.eq(users::id).and(deliveries::date.eq(date))))
        .filter(users::role.eq(Role::User.as_str()))
        .select((users::name, deliveries::liters.nullable()))
        .order(users::name.asc())
        .load(&conn)?;

    Ok(rows.into_iter()
        .map(|(name, liters)| BreakdownRow { name, liters: liters.unwrap_or(0.0) })
        .collect())
}

#[derive(Debug, PartialEq)]
pub struct DeliveryListing {
    pub date: NaiveDate,
    pub name: String,
    pub liters: f64,
}

pub fn recent_deliveries(ctx: &AppData) -> ServiceResult<Vec<DeliveryListing>> {
    use crate::schema::{deliveries, users};

    let conn = ctx.pool.get()?;

    let rows: Vec<(NaiveDate, String, f64)> = deliveries::table
        .inner_join(users::table)
        .select((deliveries::date, users::name, deliveries::liters))
        .order((deliveries::date.desc(), users::name.asc()))
        .limit(RECENT_DELIVERIES_LIMIT)
        .load(&conn)?;

    Ok(rows.into_iter()
        .map(|(date, name, liters)| DeliveryListing { date, name, liters })
        .collect())
}
