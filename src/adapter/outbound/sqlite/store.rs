//! SQLite route and history store.
//!
//! Diesel calls block, so every operation runs on tokio's blocking pool.
//! A record is one immediate transaction: the route check, the read of the
//! existing history, and the write commit together or not at all.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{ObservationRow, RouteRow};
use crate::adapter::outbound::sqlite::database::schema::{observations, routes};
use crate::domain::{
    Currency, Itinerary, PriceHistory, PriceObservation, RecordOutcome, RouteConfig, RouteId,
};
use crate::error::{Error, Result};
use crate::port::{HistoryStore, RouteStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed implementation of [`RouteStore`] and [`HistoryStore`].
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Create a store over a migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| Error::Storage(format!("storage task failed: {e}")))?
    }

    fn route_to_row(route: &RouteConfig, now: &str) -> Result<RouteRow> {
        Ok(RouteRow {
            id: route.id().to_string(),
            name: route.name().to_string(),
            params: serde_json::to_string(route)?,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn route_from_row(row: RouteRow) -> Result<RouteConfig> {
        let route: RouteConfig = serde_json::from_str(&row.params)?;
        route.validate()?;
        Ok(route)
    }

    fn observation_to_row(route_id: &RouteId, observation: &PriceObservation) -> Result<ObservationRow> {
        Ok(ObservationRow {
            route_id: route_id.to_string(),
            date: observation.date().format(DATE_FORMAT).to_string(),
            price: observation.price().to_string(),
            currency: observation.currency().to_string(),
            itinerary: observation
                .itinerary()
                .map(serde_json::to_string)
                .transpose()?,
            recorded_at: Utc::now().to_rfc3339(),
        })
    }

    fn observation_from_row(row: ObservationRow) -> Result<PriceObservation> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| Error::Parse(format!("bad date '{}': {e}", row.date)))?;
        let price = Decimal::from_str(&row.price)
            .map_err(|e| Error::Parse(format!("bad price '{}': {e}", row.price)))?;
        let currency = Currency::try_new(&row.currency)?;
        let observation = PriceObservation::new(date, price, currency);
        Ok(match row.itinerary {
            Some(json) => observation.with_itinerary(serde_json::from_str::<Itinerary>(&json)?),
            None => observation,
        })
    }

    fn load_history(conn: &mut SqliteConnection, route_id: &str) -> Result<PriceHistory> {
        let rows: Vec<ObservationRow> = observations::table
            .filter(observations::route_id.eq(route_id))
            .order(observations::date.asc())
            .select(ObservationRow::as_select())
            .load(conn)?;
        rows.into_iter()
            .map(Self::observation_from_row)
            .collect::<Result<Vec<_>>>()
            .map(PriceHistory::from)
    }
}

#[async_trait::async_trait]
impl RouteStore for SqliteStore {
    async fn save_route(&self, route: &RouteConfig) -> Result<()> {
        route.validate()?;
        let row = Self::route_to_row(route, &Utc::now().to_rfc3339())?;
        self.with_conn(move |conn| {
            // An upsert, not REPLACE: replacing the row would cascade-delete its history.
            diesel::insert_into(routes::table)
                .values(&row)
                .on_conflict(routes::id)
                .do_update()
                .set((
                    routes::name.eq(&row.name),
                    routes::params.eq(&row.params),
                    routes::updated_at.eq(&row.updated_at),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn insert_route(&self, route: &RouteConfig) -> Result<()> {
        route.validate()?;
        let row = Self::route_to_row(route, &Utc::now().to_rfc3339())?;
        let id = route.id().clone();
        self.with_conn(move |conn| {
            match diesel::insert_into(routes::table).values(&row).execute(conn) {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Err(Error::DuplicateRoute(id))
                }
                Err(err) => Err(err.into()),
            }
        })
        .await
    }

    async fn get_route(&self, id: &RouteId) -> Result<Option<RouteConfig>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let row: Option<RouteRow> = routes::table
                .find(id)
                .select(RouteRow::as_select())
                .first(conn)
                .optional()?;
            row.map(Self::route_from_row).transpose()
        })
        .await
    }

    async fn list_routes(&self) -> Result<Vec<RouteConfig>> {
        self.with_conn(|conn| {
            let rows: Vec<RouteRow> = routes::table
                .order((routes::name.asc(), routes::id.asc()))
                .select(RouteRow::as_select())
                .load(conn)?;
            rows.into_iter().map(Self::route_from_row).collect()
        })
        .await
    }

    async fn delete_route(&self, id: &RouteId) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| {
                diesel::delete(observations::table.filter(observations::route_id.eq(&id)))
                    .execute(conn)?;
                let deleted = diesel::delete(routes::table.find(&id)).execute(conn)?;
                Ok(deleted > 0)
            })
        })
        .await
    }
}

#[async_trait::async_trait]
impl HistoryStore for SqliteStore {
    async fn record(
        &self,
        route_id: &RouteId,
        observation: &PriceObservation,
    ) -> Result<RecordOutcome> {
        observation.validate()?;
        let route_id = route_id.clone();
        let row = Self::observation_to_row(&route_id, observation)?;
        let observation = observation.clone();

        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| {
                let exists: i64 = routes::table
                    .filter(routes::id.eq(route_id.as_str()))
                    .count()
                    .get_result(conn)?;
                if exists == 0 {
                    return Err(Error::UnknownRoute(route_id.clone()));
                }

                let mut history = Self::load_history(conn, route_id.as_str())?;
                let outcome = history.upsert(observation)?;

                diesel::replace_into(observations::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(outcome)
            })
        })
        .await
    }

    async fn history(&self, route_id: &RouteId) -> Result<PriceHistory> {
        let route_id = route_id.to_string();
        self.with_conn(move |conn| Self::load_history(conn, &route_id))
            .await
    }
}
