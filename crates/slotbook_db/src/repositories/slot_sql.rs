//! SQL implementation of the slot repository

use crate::error::DbError;
use crate::repositories::slot::{GuardedUpdate, Slot, SlotRepository, SlotTransition};
use crate::repositories::{date_key, parse_date, parse_time, time_key};
use crate::DbClient;
use chrono::{NaiveDate, NaiveTime};
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the slot repository
#[derive(Debug, Clone)]
pub struct SqlSlotRepository {
    db_client: DbClient,
}

impl SqlSlotRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn slot_from_row(row: &sqlx::any::AnyRow) -> Result<Slot, DbError> {
        let date: String = row.try_get("date")?;
        let time: String = row.try_get("time")?;
        let is_available: i64 = row.try_get("is_available")?;
        Ok(Slot {
            date: parse_date(&date)?,
            time: parse_time(&time)?,
            is_available: is_available != 0,
        })
    }
}

impl SlotRepository for SqlSlotRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing slot schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS slots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                is_available INTEGER NOT NULL DEFAULT 1,
                UNIQUE(date, time)
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Slot schema initialized successfully");
        Ok(())
    }

    async fn list_available(&self, date: NaiveDate) -> Result<Vec<NaiveTime>, DbError> {
        debug!("Listing available slots for {}", date);

        let query = r#"
            SELECT time FROM slots
            WHERE date = $1 AND is_available = 1
            ORDER BY time ASC
        "#;
        let rows = sqlx::query(query)
            .bind(date_key(date))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list available slots: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter()
            .map(|row| {
                let time: String = row.try_get("time")?;
                parse_time(&time)
            })
            .collect()
    }

    async fn find(&self, date: NaiveDate, time: NaiveTime) -> Result<Option<Slot>, DbError> {
        let query = r#"
            SELECT date, time, is_available FROM slots
            WHERE date = $1 AND time = $2
        "#;
        let row = sqlx::query(query)
            .bind(date_key(date))
            .bind(time_key(time))
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find slot {} {}: {}", date, time, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(Self::slot_from_row).transpose()
    }

    async fn set_availability(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> Result<bool, DbError> {
        debug!("Setting slot {} {} available={}", date, time, available);

        let query = r#"
            UPDATE slots SET is_available = $1
            WHERE date = $2 AND time = $3
        "#;
        let result = sqlx::query(query)
            .bind(available as i64)
            .bind(date_key(date))
            .bind(time_key(time))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to set slot availability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn transition(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        from: bool,
        to: bool,
    ) -> Result<SlotTransition, DbError> {
        debug!("Transition slot {} {}: {} -> {}", date, time, from, to);

        let query = r#"
            UPDATE slots SET is_available = $1
            WHERE date = $2 AND time = $3 AND is_available = $4
        "#;
        let result = sqlx::query(query)
            .bind(to as i64)
            .bind(date_key(date))
            .bind(time_key(time))
            .bind(from as i64)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to transition slot: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() > 0 {
            return Ok(SlotTransition::Applied);
        }
        match self.find(date, time).await? {
            Some(_) => Ok(SlotTransition::PreconditionFailed),
            None => Ok(SlotTransition::NotFound),
        }
    }

    async fn set_availability_unless_booked(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> Result<GuardedUpdate, DbError> {
        debug!(
            "Guarded update of slot {} {} to available={}",
            date, time, available
        );

        let query = r#"
            UPDATE slots SET is_available = $1
            WHERE date = $2 AND time = $3
              AND NOT EXISTS (
                  SELECT 1 FROM appointments a
                  WHERE a.date = slots.date
                    AND a.time = slots.time
                    AND a.status <> 'cancelled'
              )
        "#;
        let result = sqlx::query(query)
            .bind(available as i64)
            .bind(date_key(date))
            .bind(time_key(time))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed guarded slot update: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() > 0 {
            return Ok(GuardedUpdate::Updated);
        }
        match self.find(date, time).await? {
            Some(_) => Ok(GuardedUpdate::Booked),
            None => Ok(GuardedUpdate::NotFound),
        }
    }

    async fn provision(&self, keys: &[(NaiveDate, NaiveTime)]) -> Result<u64, DbError> {
        debug!("Provisioning up to {} slots", keys.len());

        let query = r#"
            INSERT INTO slots (date, time, is_available)
            VALUES ($1, $2, 1)
            ON CONFLICT(date, time) DO NOTHING
        "#;

        let mut tx = self.db_client.begin().await?;
        let mut inserted = 0;
        for (date, time) in keys {
            let result = sqlx::query(query)
                .bind(date_key(*date))
                .bind(time_key(*time))
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to provision slot {} {}: {}", date, time, e);
                    DbError::QueryError(e.to_string())
                })?;
            inserted += result.rows_affected();
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Provisioned {} new slots", inserted);
        Ok(inserted)
    }

    async fn list_between(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Slot>, DbError> {
        let query = r#"
            SELECT date, time, is_available FROM slots
            WHERE date >= $1 AND date < $2
            ORDER BY date ASC, time ASC
        "#;
        let rows = sqlx::query(query)
            .bind(date_key(from))
            .bind(date_key(until))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list slots: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(Self::slot_from_row).collect()
    }
}
