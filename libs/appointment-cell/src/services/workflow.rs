// libs/appointment-cell/src/services/workflow.rs
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use notification_cell::{DeliveryOutcome, NotificationGateway};
use patient_cell::{PatientDirectory, PatientId, PatientLookup};
use schedule_cell::ScheduleStore;
use shared_models::AppError;

use crate::models::{
    AbandonReason, AdminReportRow, BookingSession, ConfirmationStatus, PatientStatus,
    SessionOutcome, WorkflowStep,
};
use crate::services::confirmation::ConfirmationSettings;
use crate::services::input::PatientInputSource;
use crate::services::lifecycle::SessionLifecycleService;
use crate::services::report::ReportSink;

/// Drives one patient at a time from greeting to a confirmed booking.
///
/// Sessions are isolated: the workflow keeps no per-session state, so one
/// instance can run any number of sessions one after another.
pub struct BookingWorkflow {
    directory: Arc<PatientDirectory>,
    schedule: Arc<ScheduleStore>,
    report: Arc<ReportSink>,
    notifier: Arc<dyn NotificationGateway>,
    settings: ConfirmationSettings,
    lifecycle: SessionLifecycleService,
}

impl BookingWorkflow {
    pub fn new(
        directory: Arc<PatientDirectory>,
        schedule: Arc<ScheduleStore>,
        report: Arc<ReportSink>,
        notifier: Arc<dyn NotificationGateway>,
        settings: ConfirmationSettings,
    ) -> Self {
        Self {
            directory,
            schedule,
            report,
            notifier,
            settings,
            lifecycle: SessionLifecycleService::new(),
        }
    }

    /// Runs a full session against `input`.
    ///
    /// Abandonment is an `Ok` outcome. `Err` is reserved for storage failures
    /// and for losing the chosen slot to another booking between the
    /// availability check and the booking write (retryable).
    #[instrument(skip_all, fields(session_id = tracing::field::Empty))]
    pub async fn run(&self, input: &dyn PatientInputSource) -> Result<SessionOutcome, AppError> {
        let mut session = BookingSession::new();
        tracing::Span::current().record("session_id", tracing::field::display(session.session_id));

        // **Step 1: Greeting**
        input
            .announce(&format!(
                "Hello! I'm the scheduling assistant for {}. Could I get your full name and date of birth (MM/DD/YYYY)?",
                self.settings.clinic_name
            ))
            .await;
        let identity = input.get_patient_identity().await;
        session.patient_name = identity.full_name;
        session.patient_dob = identity.date_of_birth;
        self.lifecycle.advance(&mut session, WorkflowStep::Lookup)?;

        // **Step 2: Lookup**
        if let Some(reason) = self.lookup_patient(&mut session, input).await? {
            return self.abandon(session, reason, input).await;
        }
        self.lifecycle.advance(&mut session, WorkflowStep::Availability)?;

        // **Step 3: Availability**
        if let Some(reason) = self.show_availability(&mut session, input).await? {
            return self.abandon(session, reason, input).await;
        }

        // **Step 4: Insurance (new patients only)**
        if session.patient_status == Some(PatientStatus::New) {
            self.lifecycle.advance(&mut session, WorkflowStep::InsuranceCollection)?;
            input
                .announce("As a new patient, I need your insurance carrier, member ID, and group number.")
                .await;
            session.insurance = Some(input.get_insurance_info().await);
        }

        // **Step 5: Confirmation**
        self.lifecycle.advance(&mut session, WorkflowStep::Confirmation)?;
        self.confirm_booking(&mut session, input).await?;
        self.lifecycle.advance(&mut session, WorkflowStep::Done)?;

        info!(
            "Session {} confirmed {} for patient {}",
            session.session_id,
            session.selected_slot.as_ref().map(|slot| slot.label()).unwrap_or_default(),
            session.patient_id
        );
        Ok(SessionOutcome::Confirmed(session))
    }

    /// Returns the reason to abandon, if any.
    async fn lookup_patient(
        &self,
        session: &mut BookingSession,
        input: &dyn PatientInputSource,
    ) -> Result<Option<AbandonReason>, AppError> {
        input.announce("Checking our records for you...").await;

        let status = match self.directory.lookup(&session.patient_name, &session.patient_dob).await {
            Ok(PatientLookup::Found(record)) => {
                session.patient_id = record.patient_id;
                if record.is_returning {
                    input.announce("Welcome back! I see you are a returning patient.").await;
                    PatientStatus::Returning
                } else {
                    input.announce("It looks like you're a new patient. Welcome!").await;
                    PatientStatus::New
                }
            }
            Ok(PatientLookup::NotFound) => {
                session.patient_id = PatientId::UNREGISTERED;
                input.announce("It looks like you're a new patient. Welcome!").await;
                PatientStatus::New
            }
            Err(AppError::InputFormat(detail)) => {
                warn!("Lookup failed for session {}: {}", session.session_id, detail);
                session.patient_status = Some(PatientStatus::LookupFailed);
                return Ok(Some(AbandonReason::InvalidDateOfBirth(detail)));
            }
            Err(e) => return Err(e),
        };

        session.patient_status = Some(status);
        session.appointment_duration = status.required_duration();
        info!("Patient status {} requires {:?}", status, session.appointment_duration);
        Ok(None)
    }

    async fn show_availability(
        &self,
        session: &mut BookingSession,
        input: &dyn PatientInputSource,
    ) -> Result<Option<AbandonReason>, AppError> {
        let Some(duration) = session.appointment_duration else {
            return Err(AppError::InvalidTransition {
                from: WorkflowStep::Lookup.to_string(),
                to: WorkflowStep::Availability.to_string(),
            });
        };

        input
            .announce(&format!("You need a {} appointment. Let me check the doctor's calendar...", duration))
            .await;

        let slots = self.schedule.find_available(duration).await?;
        if slots.is_empty() {
            return Ok(Some(AbandonReason::NoAvailableSlots(duration)));
        }

        let listing: Vec<String> = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| format!("  {}. {}", i + 1, slot.label()))
            .collect();
        input
            .announce(&format!("Here are the available slots I found:\n{}", listing.join("\n")))
            .await;

        session.available_slots = slots;
        let choice = input.choose_slot(&session.available_slots).await;

        match choice {
            Some(slot) if session.available_slots.contains(&slot) => {
                info!("Patient chose {}", slot.label());
                session.selected_slot = Some(slot);
                Ok(None)
            }
            Some(slot) => {
                warn!("Chosen slot {} was not among the offered candidates", slot.label());
                Ok(Some(AbandonReason::NoSlotChosen))
            }
            None => Ok(Some(AbandonReason::NoSlotChosen)),
        }
    }

    /// Books the slot, reports it, then emails the patient. The email is best
    /// effort and never undoes the first two steps.
    async fn confirm_booking(
        &self,
        session: &mut BookingSession,
        input: &dyn PatientInputSource,
    ) -> Result<(), AppError> {
        let Some(chosen) = session.selected_slot.clone() else {
            return Err(AppError::InvalidTransition {
                from: WorkflowStep::Availability.to_string(),
                to: WorkflowStep::Confirmation.to_string(),
            });
        };

        let mut summary = format!(
            "Let's confirm the details of your appointment:\n  - Patient: {}\n  - Appointment: {}",
            session.patient_name,
            chosen.label()
        );
        if let Some(insurance) = &session.insurance {
            summary.push_str(&format!("\n  - Insurance: {} (ID: {})", insurance.carrier, insurance.member_id));
        }
        input.announce(&summary).await;

        let booked = self
            .schedule
            .book(chosen.date, chosen.start_time, chosen.duration, session.patient_id)
            .await?;

        self.report
            .append(&AdminReportRow::confirmed(session.patient_id, &session.patient_name, &booked))
            .await?;

        let message = self.settings.build_email(&session.patient_name, &booked).await;
        let outcome = self.notifier.send(&message).await;
        match &outcome {
            DeliveryOutcome::Sent => info!("Confirmation email sent for session {}", session.session_id),
            DeliveryOutcome::Skipped(reason) => warn!("Confirmation email skipped: {}", reason),
            DeliveryOutcome::Failed(reason) => error!("Confirmation email failed: {}", reason),
        }

        session.selected_slot = Some(booked);
        session.notification = Some(outcome);
        session.confirmation_status = ConfirmationStatus::Confirmed;
        input.announce("Your appointment is confirmed!").await;
        Ok(())
    }

    async fn abandon(
        &self,
        mut session: BookingSession,
        reason: AbandonReason,
        input: &dyn PatientInputSource,
    ) -> Result<SessionOutcome, AppError> {
        self.lifecycle.advance(&mut session, WorkflowStep::Abandoned)?;
        match reason.as_error() {
            Some(e) => warn!("Session {} abandoned: {}", session.session_id, e),
            None => info!("Session {} abandoned: {}", session.session_id, reason),
        }
        input
            .announce(&format!("I'm sorry, I'm unable to proceed with your booking: {}.", reason))
            .await;
        Ok(SessionOutcome::Abandoned { session, reason })
    }
}
