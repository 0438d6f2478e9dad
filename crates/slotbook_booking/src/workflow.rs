// --- File: crates/slotbook_booking/src/workflow.rs ---
//! The reservation workflow.
//!
//! Booking is a short saga: take the slot together with a pending appointment, then hand
//! the customer off to checkout. The slot flag and the appointment row change in one
//! store transaction, so the admin guard never sees a taken slot without its booking.
//! Every forward step pushes its undo action; when a later step fails the undo actions
//! run newest first, so a failed booking leaves the calendar exactly as it found it.

use crate::calendar::SlotCalendar;
use crate::error::BookingError;
use crate::logic::{
    validate_booking, BookingRequest, BookingResponse, DepositPolicy, ValidatedBooking,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use slotbook_common::models::{format_cents, Appointment, AppointmentStatus, NewAppointment};
use slotbook_common::services::{
    CatalogEntry, CatalogService, CheckoutRequest, CheckoutService, CheckoutSession,
};
use slotbook_config::BookingConfig;
use slotbook_db::{
    AppointmentRepository, DbClient, DbError, SlotReservation, SqlAppointmentRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Knobs taken from `[booking]`.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub deposit: DepositPolicy,
    pub currency: String,
    pub checkout_timeout: Duration,
}

impl WorkflowSettings {
    pub fn from_config(config: &BookingConfig) -> Result<Self, BookingError> {
        Ok(Self {
            deposit: DepositPolicy::from_fraction(config.deposit_fraction)?,
            currency: config.currency.clone(),
            checkout_timeout: Duration::from_millis(config.checkout_timeout_ms),
        })
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            deposit: DepositPolicy::default(),
            currency: "usd".to_string(),
            checkout_timeout: Duration::from_secs(15),
        }
    }
}

pub struct ReservationWorkflow {
    calendar: SlotCalendar,
    appointments: SqlAppointmentRepository,
    catalog: Arc<dyn CatalogService>,
    checkout: Arc<dyn CheckoutService>,
    settings: WorkflowSettings,
}

/// Undo action for a forward step that already took effect.
#[derive(Debug, Clone, PartialEq)]
enum Compensation {
    /// Delete the pending appointment and reopen its slot, atomically.
    DiscardReservation(i64),
}

struct Saga<'a> {
    workflow: &'a ReservationWorkflow,
    undo: Vec<Compensation>,
}

impl<'a> Saga<'a> {
    fn new(workflow: &'a ReservationWorkflow) -> Self {
        Self {
            workflow,
            undo: Vec::new(),
        }
    }

    fn record(&mut self, step: Compensation) {
        self.undo.push(step);
    }

    /// Runs the recorded undo actions newest first and returns the error to report.
    ///
    /// All actions are attempted even if one fails; any failure turns `cause` into
    /// [`BookingError::CompensationFailed`]. A failed action changes nothing.
    async fn unwind(self, cause: BookingError) -> BookingError {
        let mut failures = Vec::new();
        for step in self.undo.into_iter().rev() {
            let outcome = match &step {
                Compensation::DiscardReservation(id) => {
                    match self.workflow.appointments.delete_releasing_slot(*id).await {
                        Ok(true) => {
                            warn!("Discarded appointment {} and reopened its slot", id);
                            Ok(())
                        }
                        Ok(false) => {
                            warn!("Appointment {} was already gone during rollback", id);
                            Ok(())
                        }
                        Err(e) => Err(BookingError::from(e)),
                    }
                }
            };
            if let Err(e) = outcome {
                error!("Rollback step {:?} failed: {}", step, e);
                failures.push(format!("{:?}: {}", step, e));
            }
        }

        if failures.is_empty() {
            info!("Booking rolled back after: {}", cause);
            cause
        } else {
            error!(
                "Booking rollback incomplete after '{}'; manual repair needed: {}",
                cause,
                failures.join("; ")
            );
            BookingError::CompensationFailed(format!(
                "{} (rollback errors: {})",
                cause,
                failures.join("; ")
            ))
        }
    }
}

impl ReservationWorkflow {
    pub fn new(
        db_client: DbClient,
        catalog: Arc<dyn CatalogService>,
        checkout: Arc<dyn CheckoutService>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            calendar: SlotCalendar::new(db_client.clone()),
            appointments: SqlAppointmentRepository::new(db_client),
            catalog,
            checkout,
            settings,
        }
    }

    pub fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    pub fn deposit_policy(&self) -> DepositPolicy {
        self.settings.deposit
    }

    pub async fn list_services(&self) -> Result<Vec<CatalogEntry>, BookingError> {
        self.catalog
            .list_bookable_services()
            .await
            .map_err(|e| BookingError::Catalog(e.to_string()))
    }

    /// The catalog's entry for `service_id`. Prices never come from the client.
    pub async fn resolve_service(&self, service_id: &str) -> Result<CatalogEntry, BookingError> {
        let entry = self
            .list_services()
            .await?
            .into_iter()
            .find(|entry| entry.id == service_id)
            .ok_or_else(|| BookingError::Validation(format!("Unknown service '{}'", service_id)))?;
        if entry.price_cents <= 0 {
            return Err(BookingError::Validation(format!(
                "Service '{}' has no valid price",
                service_id
            )));
        }
        Ok(entry)
    }

    pub async fn book(&self, request: BookingRequest) -> Result<BookingResponse, BookingError> {
        self.book_at(request, Local::now().naive_local()).await
    }

    /// Books with an explicit notion of "now", which only matters for the past-slot check.
    pub async fn book_at(
        &self,
        request: BookingRequest,
        now: NaiveDateTime,
    ) -> Result<BookingResponse, BookingError> {
        let booking = validate_booking(&request, now)?;
        let service = self.resolve_service(&booking.service_id).await?;

        if !self.calendar.is_available(booking.date, booking.time).await? {
            debug!("Slot {} {} not available", booking.date, booking.time);
            return Err(BookingError::SlotUnavailable {
                date: booking.date,
                time: booking.time,
            });
        }

        let deposit_cents = self.settings.deposit.deposit_for(service.price_cents);
        let mut saga = Saga::new(self);

        // Losing the race here leaves nothing to undo.
        let unavailable = BookingError::SlotUnavailable {
            date: booking.date,
            time: booking.time,
        };
        let appointment = match self
            .appointments
            .insert_reserving_slot(new_appointment(&booking, &service, deposit_cents))
            .await
        {
            Ok(SlotReservation::Reserved(appointment)) => appointment,
            Ok(SlotReservation::Unavailable | SlotReservation::SlotNotFound) => {
                debug!("Lost slot {} {} to another writer", booking.date, booking.time);
                return Err(unavailable);
            }
            Err(DbError::UniqueViolation(_)) => return Err(unavailable),
            Err(e) => return Err(BookingError::Store(e)),
        };
        saga.record(Compensation::DiscardReservation(appointment.id));

        let session = match self.hand_off(&appointment).await {
            Ok(session) => session,
            Err(cause) => return Err(saga.unwind(cause).await),
        };

        info!(
            "Appointment {} reserved for {} {} ({} deposit), awaiting checkout",
            appointment.id,
            appointment.date,
            appointment.time,
            format_cents(deposit_cents)
        );
        Ok(BookingResponse {
            appointment_id: appointment.id,
            redirect_url: session.redirect_url,
            deposit_cents,
            deposit_display: format_cents(deposit_cents),
            status: appointment.status,
        })
    }

    async fn hand_off(&self, appointment: &Appointment) -> Result<CheckoutSession, BookingError> {
        let request = CheckoutRequest {
            appointment_id: appointment.id,
            deposit_cents: appointment.deposit_cents,
            currency: self.settings.currency.clone(),
            customer_name: appointment.customer_name.clone(),
            customer_email: appointment.email.clone(),
        };
        let session = tokio::time::timeout(
            self.settings.checkout_timeout,
            self.checkout.create_checkout_session(request),
        )
        .await
        .map_err(|_| {
            BookingError::BookingFailed(format!(
                "checkout did not answer within {} ms",
                self.settings.checkout_timeout.as_millis()
            ))
        })?
        .map_err(|e| BookingError::BookingFailed(format!("checkout error: {}", e)))?;

        if !is_redirect_target(&session.redirect_url) {
            return Err(BookingError::BookingFailed(format!(
                "checkout returned an unusable redirect '{}'",
                session.redirect_url
            )));
        }
        Ok(session)
    }

    /// Moves a pending appointment to confirmed. Confirming twice is harmless.
    pub async fn confirm_appointment(
        &self,
        id: i64,
        order_reference: &str,
    ) -> Result<Appointment, BookingError> {
        let order_reference = order_reference.trim();
        if order_reference.is_empty() {
            return Err(BookingError::Validation(
                "order reference is required".to_string(),
            ));
        }

        if self.appointments.confirm(id, order_reference).await? {
            info!("Appointment {} confirmed by order {}", id, order_reference);
            return self.get_appointment(id).await;
        }

        let current = self.get_appointment(id).await?;
        match current.status {
            AppointmentStatus::Confirmed => {
                debug!("Appointment {} already confirmed", id);
                Ok(current)
            }
            from => Err(BookingError::InvalidTransition {
                id,
                from,
                to: AppointmentStatus::Confirmed,
            }),
        }
    }

    /// Cancels a live appointment and returns its slot to the calendar.
    pub async fn cancel_appointment(&self, id: i64) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(id).await?;
        if !self.appointments.cancel(id).await? {
            return Err(BookingError::InvalidTransition {
                id,
                from: current.status,
                to: AppointmentStatus::Cancelled,
            });
        }
        self.calendar
            .set_availability(current.date, current.time, true)
            .await?;
        info!(
            "Appointment {} cancelled, slot {} {} released",
            id, current.date, current.time
        );
        self.get_appointment(id).await
    }

    /// Cancels an appointment whose checkout was abandoned and reopens its slot.
    ///
    /// Only a still-pending appointment is touched; returns `None` when it was already
    /// confirmed or cancelled, so a late payment can never be undone.
    pub async fn expire_pending_appointment(
        &self,
        id: i64,
    ) -> Result<Option<Appointment>, BookingError> {
        if !self.appointments.expire_pending(id).await? {
            let current = self.get_appointment(id).await?;
            debug!(
                "Appointment {} is {}, expiry ignored",
                id,
                current.status.as_str()
            );
            return Ok(None);
        }
        info!("Appointment {} expired unpaid", id);
        self.get_appointment(id).await.map(Some)
    }

    pub async fn get_appointment(&self, id: i64) -> Result<Appointment, BookingError> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(id))
    }

    /// Live appointments on or after `from`, ordered by date then time.
    pub async fn upcoming_appointments(
        &self,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.appointments.list_live_from(from).await?)
    }

    /// The live appointment holding a slot, if any.
    pub async fn appointment_for_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<Appointment>, BookingError> {
        Ok(self.appointments.find_live_for_slot(date, time).await?)
    }
}

fn new_appointment(
    booking: &ValidatedBooking,
    service: &CatalogEntry,
    deposit_cents: i64,
) -> NewAppointment {
    NewAppointment {
        customer_name: booking.customer_name.clone(),
        email: booking.email.clone(),
        phone: booking.phone.clone(),
        service_id: service.id.clone(),
        service_name: service.display_name.clone(),
        date: booking.date,
        time: booking.time,
        total_price_cents: service.price_cents,
        deposit_cents,
    }
}

/// An absolute URI the customer's browser can be sent to.
fn is_redirect_target(url: &str) -> bool {
    url.parse::<http::Uri>()
        .map(|uri| uri.scheme().is_some() && uri.host().is_some())
        .unwrap_or(false)
}
