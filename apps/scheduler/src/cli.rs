use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clinic-scheduler")]
#[command(about = "Appointment booking and reminder emails for a single-doctor clinic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Book an appointment for one patient
    Book(BookArgs),
    /// Email reminders for upcoming appointments
    Reminders(ReminderArgs),
    /// List schedule slots
    Slots {
        /// Only available slots of this length in minutes (30 or 60)
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Print the admin report of confirmed bookings
    Report,
}

#[derive(Args)]
pub struct BookArgs {
    /// Patient full name, e.g. "Peter Jones"
    #[arg(long, requires = "dob")]
    pub name: Option<String>,
    /// Date of birth as MM/DD/YYYY
    #[arg(long, requires = "name")]
    pub dob: Option<String>,
    /// Insurance carrier (new patients)
    #[arg(long, default_value = "")]
    pub carrier: String,
    /// Insurance member ID (new patients)
    #[arg(long, default_value = "")]
    pub member_id: String,
    /// Insurance group number (new patients)
    #[arg(long, default_value = "")]
    pub group: String,
    /// Ask for every answer on the terminal
    #[arg(long, conflicts_with_all = ["name", "dob", "earliest"])]
    pub interactive: bool,
    /// Pick the earliest slot instead of the first one listed
    #[arg(long)]
    pub earliest: bool,
    /// Keep the confirmation email in memory instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ReminderArgs {
    /// Run a single scan and exit
    #[arg(long)]
    pub once: bool,
    /// Scan as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Keep reminder emails in memory instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}
