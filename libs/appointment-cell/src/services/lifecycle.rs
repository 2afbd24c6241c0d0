// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use shared_models::AppError;

use crate::models::{BookingSession, WorkflowStep};

pub struct SessionLifecycleService;

impl Default for SessionLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a step transition is allowed
    pub fn validate_transition(
        &self,
        current_step: &WorkflowStep,
        next_step: &WorkflowStep,
    ) -> Result<(), AppError> {
        debug!("Validating workflow transition from {} to {}", current_step, next_step);

        if !self.get_valid_transitions(current_step).contains(next_step) {
            warn!("Invalid workflow transition attempted: {} -> {}", current_step, next_step);
            return Err(AppError::InvalidTransition {
                from: current_step.to_string(),
                to: next_step.to_string(),
            });
        }

        Ok(())
    }

    /// Get all valid next steps for a given current step
    pub fn get_valid_transitions(&self, current_step: &WorkflowStep) -> Vec<WorkflowStep> {
        match current_step {
            WorkflowStep::Greeting => vec![WorkflowStep::Lookup],
            WorkflowStep::Lookup => vec![
                WorkflowStep::Availability,
                WorkflowStep::Abandoned, // malformed date of birth
            ],
            WorkflowStep::Availability => vec![
                WorkflowStep::InsuranceCollection,
                WorkflowStep::Confirmation,
                WorkflowStep::Abandoned,
            ],
            WorkflowStep::InsuranceCollection => vec![WorkflowStep::Confirmation],
            WorkflowStep::Confirmation => vec![WorkflowStep::Done],
            // Terminal states - no transitions allowed
            WorkflowStep::Done => vec![],
            WorkflowStep::Abandoned => vec![],
        }
    }

    /// Move `session` to `next_step`, recording it in the session history.
    pub fn advance(&self, session: &mut BookingSession, next_step: WorkflowStep) -> Result<(), AppError> {
        self.validate_transition(&session.step, &next_step)?;

        info!(session_id = %session.session_id, "Workflow step: {} -> {}", session.step, next_step);
        session.step = next_step;
        session.history.push(next_step);
        if next_step.is_terminal() {
            debug!(session_id = %session.session_id, "Session finished after {} steps", session.history.len());
        }
        Ok(())
    }
}
