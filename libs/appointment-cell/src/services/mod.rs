pub mod confirmation;
pub mod input;
pub mod lifecycle;
pub mod report;
pub mod selection;
pub mod workflow;

pub use confirmation::ConfirmationSettings;
pub use input::{PatientInputSource, ScriptedInput};
pub use lifecycle::SessionLifecycleService;
pub use report::ReportSink;
pub use selection::{EarliestSlot, FirstAvailable, SlotSelector};
pub use workflow::BookingWorkflow;
