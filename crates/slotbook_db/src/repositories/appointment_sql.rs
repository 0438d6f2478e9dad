//! SQL implementation of the appointment repository

use crate::error::DbError;
use crate::repositories::appointment::{
    Appointment, AppointmentRepository, AppointmentStatus, NewAppointment, SlotReservation,
};
use crate::repositories::{date_key, parse_date, parse_time, time_key};
use crate::DbClient;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::Row;
use tracing::{debug, error, info, warn};

const SELECT_COLUMNS: &str = "id, customer_name, email, phone, service_id, service_name, \
     date, time, total_price_cents, deposit_cents, status, order_reference, created_at";

/// SQL implementation of the appointment repository
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    fn appointment_from_row(row: &sqlx::any::AnyRow) -> Result<Appointment, DbError> {
        let date: String = row.try_get("date")?;
        let time: String = row.try_get("time")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Appointment {
            id: row.try_get("id")?,
            customer_name: row.try_get("customer_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            service_id: row.try_get("service_id")?,
            service_name: row.try_get("service_name")?,
            date: parse_date(&date)?,
            time: parse_time(&time)?,
            total_price_cents: row.try_get("total_price_cents")?,
            deposit_cents: row.try_get("deposit_cents")?,
            status: status.parse::<AppointmentStatus>().map_err(DbError::DecodeError)?,
            order_reference: row.try_get("order_reference")?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| DbError::DecodeError(format!("created_at '{}': {}", created_at, e)))?
                .with_timezone(&Utc),
        })
    }

    /// Inserts a `pending` row through `executor` and returns its id.
    async fn insert_pending<'e, E>(
        executor: E,
        appointment: &NewAppointment,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DbError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Any> + 'e,
    {
        let query = r#"
            INSERT INTO appointments (
                customer_name, email, phone, service_id, service_name,
                date, time, total_price_cents, deposit_cents, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10)
            RETURNING id
        "#;
        let row = sqlx::query(query)
            .bind(appointment.customer_name.clone())
            .bind(appointment.email.clone())
            .bind(appointment.phone.clone())
            .bind(appointment.service_id.clone())
            .bind(appointment.service_name.clone())
            .bind(date_key(appointment.date))
            .bind(time_key(appointment.time))
            .bind(appointment.total_price_cents)
            .bind(appointment.deposit_cents)
            .bind(created_at.to_rfc3339())
            .fetch_one(executor)
            .await
            .map_err(|e| {
                error!("Failed to insert appointment: {}", e);
                DbError::from_query(e)
            })?;

        Ok(row.try_get("id")?)
    }

    fn pending(id: i64, appointment: NewAppointment, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            customer_name: appointment.customer_name,
            email: appointment.email,
            phone: appointment.phone,
            service_id: appointment.service_id,
            service_name: appointment.service_name,
            date: appointment.date,
            time: appointment.time,
            total_price_cents: appointment.total_price_cents,
            deposit_cents: appointment.deposit_cents,
            status: AppointmentStatus::Pending,
            order_reference: None,
            created_at,
        }
    }

    async fn fetch_many(&self, query: &str, binds: &[String]) -> Result<Vec<Appointment>, DbError> {
        let mut q = sqlx::query(query);
        for value in binds {
            q = q.bind(value.clone());
        }
        let rows = q.fetch_all(self.db_client.pool()).await.map_err(|e| {
            error!("Failed to list appointments: {}", e);
            DbError::QueryError(e.to_string())
        })?;
        rows.iter().map(Self::appointment_from_row).collect()
    }
}

impl AppointmentRepository for SqlAppointmentRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let table = r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                service_id TEXT NOT NULL,
                service_name TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                total_price_cents INTEGER NOT NULL,
                deposit_cents INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                order_reference TEXT,
                created_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(table).await?;

        // A slot may have at most one pending or confirmed appointment.
        let live_index = r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_live_slot
            ON appointments (date, time)
            WHERE status <> 'cancelled'
        "#;
        self.db_client.execute(live_index).await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!(
            "Inserting appointment for {} at {} {}",
            appointment.customer_name, appointment.date, appointment.time
        );

        let created_at = Utc::now();
        let id = Self::insert_pending(self.db_client.pool(), &appointment, created_at).await?;
        info!("Appointment {} created with status pending", id);
        Ok(Self::pending(id, appointment, created_at))
    }

    async fn insert_reserving_slot(
        &self,
        appointment: NewAppointment,
    ) -> Result<SlotReservation, DbError> {
        debug!(
            "Reserving slot {} {} for {}",
            appointment.date, appointment.time, appointment.customer_name
        );

        let date = date_key(appointment.date);
        let time = time_key(appointment.time);
        let mut tx = self.db_client.begin().await?;

        let reserve = r#"
            UPDATE slots SET is_available = 0
            WHERE date = $1 AND time = $2 AND is_available = 1
        "#;
        let reserved = sqlx::query(reserve)
            .bind(date.clone())
            .bind(time.clone())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to reserve slot {} {}: {}", date, time, e);
                DbError::QueryError(e.to_string())
            })?;

        if reserved.rows_affected() == 0 {
            let lookup = "SELECT 1 AS present FROM slots WHERE date = $1 AND time = $2";
            let existing = sqlx::query(lookup)
                .bind(date.clone())
                .bind(time.clone())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            return Ok(match existing {
                Some(_) => SlotReservation::Unavailable,
                None => SlotReservation::SlotNotFound,
            });
        }

        let created_at = Utc::now();
        let id = match Self::insert_pending(&mut *tx, &appointment, created_at).await {
            Ok(id) => id,
            Err(DbError::UniqueViolation(_)) => {
                // The slot was open yet a live appointment holds it; leave both untouched.
                warn!("Slot {} {} was available but already booked", date, time);
                return Ok(SlotReservation::Unavailable);
            }
            Err(e) => return Err(e),
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!(
            "Appointment {} created with status pending, slot {} {} reserved",
            id, date, time
        );
        Ok(SlotReservation::Reserved(Self::pending(
            id,
            appointment,
            created_at,
        )))
    }

    async fn delete_releasing_slot(&self, id: i64) -> Result<bool, DbError> {
        debug!("Deleting appointment {} and releasing its slot", id);

        let mut tx = self.db_client.begin().await?;

        let release = r#"
            UPDATE slots SET is_available = 1
            WHERE is_available = 0 AND EXISTS (
                SELECT 1 FROM appointments a
                WHERE a.id = $1 AND a.date = slots.date AND a.time = slots.time
            )
        "#;
        let released = sqlx::query(release)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to release slot of appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        let deleted = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to delete appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        debug!(
            "Appointment {}: {} row deleted, {} slot released",
            id,
            deleted.rows_affected(),
            released.rows_affected()
        );
        Ok(deleted.rows_affected() > 0)
    }

    async fn expire_pending(&self, id: i64) -> Result<bool, DbError> {
        debug!("Expiring pending appointment {}", id);

        let mut tx = self.db_client.begin().await?;

        // Runs first so the subquery still sees the appointment as pending.
        let release = r#"
            UPDATE slots SET is_available = 1
            WHERE EXISTS (
                SELECT 1 FROM appointments a
                WHERE a.id = $1 AND a.status = 'pending'
                  AND a.date = slots.date AND a.time = slots.time
            )
        "#;
        sqlx::query(release)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to release slot of appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        let cancel = r#"
            UPDATE appointments SET status = 'cancelled'
            WHERE id = $1 AND status = 'pending'
        "#;
        let cancelled = sqlx::query(cancel)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to expire appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        if cancelled.rows_affected() == 0 {
            return Ok(false);
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Appointment {} expired, slot released", id);
        Ok(true)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {} FROM appointments WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(Self::appointment_from_row).transpose()
    }

    async fn confirm(&self, id: i64, order_reference: &str) -> Result<bool, DbError> {
        debug!("Confirming appointment {} with order {}", id, order_reference);

        let query = r#"
            UPDATE appointments
            SET status = 'confirmed', order_reference = $1
            WHERE id = $2 AND status = 'pending'
        "#;
        let result = sqlx::query(query)
            .bind(order_reference.to_string())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to confirm appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel(&self, id: i64) -> Result<bool, DbError> {
        debug!("Cancelling appointment {}", id);

        let query = r#"
            UPDATE appointments SET status = 'cancelled'
            WHERE id = $1 AND status <> 'cancelled'
        "#;
        let result = sqlx::query(query)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to cancel appointment {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_live_for_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, DbError> {
        let query = format!(
            "SELECT {} FROM appointments WHERE date = $1 AND time = $2 AND status <> 'cancelled'",
            SELECT_COLUMNS
        );
        let mut found = self
            .fetch_many(&query, &[date_key(date), time_key(time)])
            .await?;
        Ok(found.pop())
    }

    async fn list_live_from(&self, from: NaiveDate) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {} FROM appointments WHERE date >= $1 AND status <> 'cancelled' \
             ORDER BY date ASC, time ASC",
            SELECT_COLUMNS
        );
        self.fetch_many(&query, &[date_key(from)]).await
    }
}
