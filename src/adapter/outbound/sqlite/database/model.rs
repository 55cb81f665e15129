//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{observations, routes};

/// Database row for a route.
///
/// `params` holds the full route as JSON so new route fields need no
/// migration.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = routes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RouteRow {
    pub id: String,
    pub name: String,
    pub params: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for one day's observation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = observations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ObservationRow {
    pub route_id: String,
    pub date: String,
    pub price: String,
    pub currency: String,
    pub itinerary: Option<String>,
    pub recorded_at: String,
}
