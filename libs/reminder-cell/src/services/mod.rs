pub mod ledger;
pub mod runner;
pub mod scanner;

pub use ledger::ReminderLedger;
pub use runner::ReminderRunner;
pub use scanner::ReminderScanner;
