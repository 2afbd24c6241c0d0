use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::{info, warn};

use appointment_cell::{
    BookingWorkflow, ConfirmationSettings, EarliestSlot, InsuranceInfo, PatientIdentity,
    PatientInputSource, ReportSink, ScriptedInput, SessionOutcome,
};
use notification_cell::{MailRelayGateway, NotificationGateway, OutboxGateway};
use patient_cell::PatientDirectory;
use reminder_cell::{ReminderLedger, ReminderRunner, ReminderScanner};
use schedule_cell::{AppointmentDuration, ScheduleStore};
use shared_config::AppConfig;
use shared_database::{CsvTableStore, TableStore};

use crate::cli::{BookArgs, ReminderArgs};
use crate::console::ConsoleInput;

const MAX_BOOKING_ATTEMPTS: usize = 3;

/// Stores and gateways shared by every command.
pub struct Clinic {
    config: AppConfig,
    tables: Arc<dyn TableStore>,
    schedule: Arc<ScheduleStore>,
}

impl Clinic {
    pub fn new(config: AppConfig) -> Self {
        let csv = CsvTableStore::new(config.data_dir.clone());
        info!("Using clinic data in {}", csv.root().display());
        let tables: Arc<dyn TableStore> = Arc::new(csv);
        let schedule = Arc::new(ScheduleStore::from_config(tables.clone(), &config));
        Self {
            config,
            tables,
            schedule,
        }
    }

    fn notifier(&self, dry_run: bool) -> Arc<dyn NotificationGateway> {
        if dry_run {
            return Arc::new(OutboxGateway::new());
        }
        Arc::new(MailRelayGateway::new(&self.config))
    }

    pub async fn book(&self, args: BookArgs) -> Result<()> {
        let workflow = BookingWorkflow::new(
            Arc::new(PatientDirectory::from_config(self.tables.clone(), &self.config)),
            self.schedule.clone(),
            Arc::new(ReportSink::from_config(self.tables.clone(), &self.config)),
            self.notifier(args.dry_run),
            ConfirmationSettings::from_config(&self.config),
        );

        if args.interactive {
            let outcome = run_with_retry(&workflow, &ConsoleInput::new()).await?;
            print_outcome(&outcome);
            return Ok(());
        }

        let mut input = match (args.name, args.dob) {
            (Some(full_name), Some(date_of_birth)) => ScriptedInput::new(
                PatientIdentity {
                    full_name,
                    date_of_birth,
                },
                InsuranceInfo {
                    carrier: args.carrier,
                    member_id: args.member_id,
                    group_number: args.group,
                },
            ),
            _ => ScriptedInput::demo(),
        };
        if args.earliest {
            input = input.with_selector(EarliestSlot);
        }

        let result = run_with_retry(&workflow, &input).await;
        for message in input.announcements().await {
            println!("{}", message);
        }
        print_outcome(&result?);
        Ok(())
    }

    pub async fn reminders(&self, args: ReminderArgs) -> Result<()> {
        let mut scanner = ReminderScanner::from_config(self.schedule.clone(), self.notifier(args.dry_run), &self.config);
        if self.config.reminder_fire_once {
            scanner = scanner.with_ledger(ReminderLedger::from_config(self.tables.clone(), &self.config));
        }

        if args.once {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            let summary = scanner.scan(today).await?;
            println!(
                "{}: {} upcoming, {} sent, {} skipped, {} failed, {} already sent",
                today, summary.considered, summary.sent, summary.skipped, summary.failed, summary.suppressed
            );
            return Ok(());
        }

        let period = Duration::from_secs(self.config.reminder_interval_seconds.max(1));
        let runner = Arc::new(ReminderRunner::new(Arc::new(scanner), period));
        let handle = {
            let runner = runner.clone();
            let fixed_today = args.today;
            tokio::spawn(async move {
                match fixed_today {
                    Some(today) => runner.start_with_clock(move || today).await,
                    None => runner.start().await,
                }
            })
        };

        println!("Reminder system is running. Press Ctrl+C to exit.");
        tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
        info!("Ctrl+C received, stopping reminder runner");
        runner.shutdown().await;
        handle.await.context("reminder runner task failed")?;
        Ok(())
    }

    pub async fn slots(&self, duration: Option<u32>) -> Result<()> {
        let slots = match duration {
            Some(minutes) => {
                let Some(duration) = AppointmentDuration::from_minutes(i64::from(minutes)) else {
                    bail!("unsupported appointment length {} (expected 30 or 60)", minutes);
                };
                self.schedule.find_available(duration).await?
            }
            None => self.schedule.slots().await?,
        };

        if slots.is_empty() {
            println!("No slots found.");
        }
        for slot in slots {
            match slot.status.booked_by() {
                Some(patient_id) => println!("{}-{} booked by {}", slot.label(), slot.ends_at().format("%H:%M"), patient_id),
                None => println!("{}-{} available", slot.label(), slot.ends_at().format("%H:%M")),
            }
        }
        Ok(())
    }

    pub async fn report(&self) -> Result<()> {
        let rows = ReportSink::from_config(self.tables.clone(), &self.config).rows().await?;
        if rows.is_empty() {
            println!("No confirmed bookings yet.");
        }
        for row in rows {
            println!("{}\t{}\t{}\t{}", row.patient_id, row.patient_name, row.appointment_time, row.status);
        }
        Ok(())
    }
}

/// Runs a session, starting over when the chosen slot was taken mid-session.
async fn run_with_retry(workflow: &BookingWorkflow, input: &dyn PatientInputSource) -> Result<SessionOutcome> {
    let mut attempt = 1;
    loop {
        match workflow.run(input).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_retryable() && attempt < MAX_BOOKING_ATTEMPTS => {
                warn!("Booking attempt {} failed ({}), starting over", attempt, e);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Confirmed(session) => {
            let slot = session.selected_slot.as_ref().map(|slot| slot.label()).unwrap_or_default();
            if session.patient_id.is_registered() {
                println!("Booked {} for {} (patient {})", slot, session.patient_name, session.patient_id);
            } else {
                println!("Booked {} for {} (new patient, not yet registered)", slot, session.patient_name);
            }
        }
        SessionOutcome::Abandoned { session, reason } => {
            println!("Session {} ended without a booking: {}", session.session_id, reason);
        }
    }
}

