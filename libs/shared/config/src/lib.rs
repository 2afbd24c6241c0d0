use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_CLINIC_NAME: &str = "MediCare Allergy & Wellness Center";
pub const DEFAULT_REMINDER_INTERVAL_SECONDS: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub patients_table: String,
    pub schedule_table: String,
    pub report_table: String,
    pub reminder_ledger_table: String,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
    pub mail_relay_url: String,
    pub intake_form_path: PathBuf,
    pub clinic_name: String,
    pub reminder_interval_seconds: u64,
    pub reminder_fire_once: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            patients_table: "patients".to_string(),
            schedule_table: "doctor_schedules".to_string(),
            report_table: "admin_report".to_string(),
            reminder_ledger_table: "reminders_sent".to_string(),
            sender_email: String::new(),
            sender_password: String::new(),
            receiver_email: String::new(),
            mail_relay_url: String::new(),
            intake_form_path: PathBuf::from("New Patient Intake Form.pdf"),
            clinic_name: DEFAULT_CLINIC_NAME.to_string(),
            reminder_interval_seconds: DEFAULT_REMINDER_INTERVAL_SECONDS,
            reminder_fire_once: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            data_dir: env::var("CLINIC_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("CLINIC_DATA_DIR not set, using default");
                    defaults.data_dir.clone()
                }),
            patients_table: env::var("PATIENTS_TABLE").unwrap_or(defaults.patients_table),
            schedule_table: env::var("SCHEDULE_TABLE").unwrap_or(defaults.schedule_table),
            report_table: env::var("REPORT_TABLE").unwrap_or(defaults.report_table),
            reminder_ledger_table: env::var("REMINDER_LEDGER_TABLE")
                .unwrap_or(defaults.reminder_ledger_table),
            sender_email: env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| {
                    warn!("SENDER_EMAIL not set, using empty value");
                    String::new()
                }),
            sender_password: env::var("SENDER_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("SENDER_PASSWORD not set, using empty value");
                    String::new()
                }),
            receiver_email: env::var("RECEIVER_EMAIL")
                .unwrap_or_else(|_| {
                    warn!("RECEIVER_EMAIL not set, using empty value");
                    String::new()
                }),
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_RELAY_URL not set, using empty value");
                    String::new()
                }),
            intake_form_path: env::var("INTAKE_FORM_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.intake_form_path),
            clinic_name: env::var("CLINIC_NAME").unwrap_or(defaults.clinic_name),
            reminder_interval_seconds: parse_var(
                "REMINDER_INTERVAL_SECONDS",
                defaults.reminder_interval_seconds,
            ),
            reminder_fire_once: parse_flag("REMINDER_FIRE_ONCE", defaults.reminder_fire_once),
        };

        if !config.is_mail_configured() {
            warn!("Mail relay not fully configured - emails will be skipped");
        }

        config
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.sender_email.is_empty()
            && !self.sender_password.is_empty()
            && !self.receiver_email.is_empty()
            && !self.mail_relay_url.is_empty()
    }
}

fn parse_var(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("{} has invalid value '{}', using default {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
