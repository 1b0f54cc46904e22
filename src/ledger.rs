use chrono::NaiveDate;
use diesel::prelude::*;

use crate::AppData;
use crate::models::{Delivery, IdType, Production};
use crate::schema::{deliveries, productions};
use crate::web::errors::{ServiceError, ServiceResult};

/// Parses a liters form value, anything that is not a non-negative number
/// is a validation failure and leaves the ledger untouched.
pub fn parse_liters(raw: &str) -> ServiceResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(x) if x >= 0.0 && x.is_finite() => Ok(x),
        _ => Err(ServiceError::Validation("liters must be a non-negative number".to_string())),
    }
}

#[derive(Insertable)]
#[table_name = "deliveries"]
struct NewDelivery {
    user_id: IdType,
    date: NaiveDate,
    liters: f64,
}

#[derive(Insertable)]
#[table_name = "productions"]
struct NewProduction {
    date: NaiveDate,
    total_liters: f64,
}

/// Upsert keyed on (user, date): a second entry for the same day overwrites
/// the liters, it never sums.
pub fn record_delivery(ctx: &AppData, user_id: IdType, date: NaiveDate, liters: f64) -> ServiceResult<Delivery> {
    use crate::schema::deliveries::dsl;

    let conn = ctx.pool.get()?;

    Ok(diesel::insert_into(dsl::deliveries)
        .values(NewDelivery { user_id, date, liters })
        .on_conflict((dsl::user_id, dsl::date))
        .do_update()
        .set(dsl::liters.eq(liters))
        .get_result(&conn)?)
}

pub fn list_deliveries_for_user(ctx: &AppData, user_id: IdType) -> ServiceResult<Vec<Delivery>> {
    use crate::schema::deliveries::dsl;

    let conn = ctx.pool.get()?;
    Ok(dsl::deliveries
        .filter(dsl::user_id.eq(user_id))
        .order(dsl::date.desc())
        .load::<Delivery>(&conn)?)
}

/// Only the owning user can remove a row; a missing or foreign id deletes
/// nothing and is not an error.
pub fn delete_delivery(ctx: &AppData, delivery_id: IdType, user_id: IdType) -> ServiceResult<()> {
    use crate::schema::deliveries::dsl;

    let conn = ctx.pool.get()?;
    diesel::delete(dsl::deliveries
        .filter(dsl::id.eq(delivery_id))
        .filter(dsl::user_id.eq(user_id)))
        .execute(&conn)?;
    Ok(())
}

/// Upsert keyed on date, overwrite semantics as for deliveries.
pub fn record_production(ctx: &AppData, date: NaiveDate, total_liters: f64) -> ServiceResult<Production> {
    use crate::schema::productions::dsl;

    let conn = ctx.pool.get()?;

    Ok(diesel::insert_into(dsl::productions)
        .values(NewProduction { date, total_liters })
        .on_conflict(dsl::date)
        .do_update()
        .set(dsl::total_liters.eq(total_liters))
        .get_result(&conn)?)
}

pub fn list_productions(ctx: &AppData) -> ServiceResult<Vec<Production>> {
    use crate::schema::productions::dsl;

    let conn = ctx.pool.get()?;
    Ok(dsl::productions
        .order(dsl::date.desc())
        .load::<Production>(&conn)?)
}

pub fn delete_production(ctx: &AppData, production_id: IdType) -> ServiceResult<()> {
    use crate::schema::productions::dsl;

    let conn = ctx.pool.get()?;
    diesel::delete(dsl::productions.find(production_id))
        .execute(&conn)?;
    Ok(())
}
