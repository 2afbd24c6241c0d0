use async_trait::async_trait;
use tokio::sync::Mutex;

use schedule_cell::Slot;

use crate::models::{InsuranceInfo, PatientIdentity};
use crate::services::selection::{FirstAvailable, SlotSelector};

/// The front-end a session talks to: it answers the workflow's questions and
/// shows the workflow's messages to the patient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientInputSource: Send + Sync {
    async fn get_patient_identity(&self) -> PatientIdentity;

    async fn get_insurance_info(&self) -> InsuranceInfo;

    /// `None` means the patient declined every candidate.
    async fn choose_slot(&self, candidates: &[Slot]) -> Option<Slot>;

    async fn announce(&self, _message: &str) {}
}

/// Fixed answers, with slot choice delegated to a `SlotSelector`.
pub struct ScriptedInput {
    identity: PatientIdentity,
    insurance: InsuranceInfo,
    selector: Box<dyn SlotSelector>,
    announcements: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new(identity: PatientIdentity, insurance: InsuranceInfo) -> Self {
        Self {
            identity,
            insurance,
            selector: Box::new(FirstAvailable),
            announcements: Mutex::new(Vec::new()),
        }
    }

    /// The walk-through patient used for demonstrations.
    pub fn demo() -> Self {
        Self::new(
            PatientIdentity {
                full_name: "Peter Jones".to_string(),
                date_of_birth: "02/15/2001".to_string(),
            },
            InsuranceInfo {
                carrier: "Cigna".to_string(),
                member_id: "CIN98765".to_string(),
                group_number: "GRP999".to_string(),
            },
        )
    }

    pub fn with_selector(mut self, selector: impl SlotSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub async fn announcements(&self) -> Vec<String> {
        self.announcements.lock().await.clone()
    }
}

#[async_trait]
impl PatientInputSource for ScriptedInput {
    async fn get_patient_identity(&self) -> PatientIdentity {
        self.identity.clone()
    }

    async fn get_insurance_info(&self) -> InsuranceInfo {
        self.insurance.clone()
    }

    async fn choose_slot(&self, candidates: &[Slot]) -> Option<Slot> {
        self.selector.select(candidates)
    }

    async fn announce(&self, message: &str) {
        self.announcements.lock().await.push(message.to_string());
    }
}
