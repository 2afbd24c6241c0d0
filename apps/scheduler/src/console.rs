use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::warn;

use appointment_cell::{InsuranceInfo, PatientIdentity, PatientInputSource};
use schedule_cell::Slot;

const MAX_CHOICE_ATTEMPTS: usize = 3;

/// Talks to the patient over stdin/stdout.
pub struct ConsoleInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    stdout: Mutex<Stdout>,
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }

    async fn write(&self, text: &str) {
        let mut stdout = self.stdout.lock().await;
        if let Err(e) = stdout.write_all(text.as_bytes()).await {
            warn!("Failed to write to stdout: {}", e);
        }
        let _ = stdout.flush().await;
    }

    /// Prompts and reads one trimmed line. End of input reads as empty.
    async fn ask(&self, prompt: &str) -> String {
        self.write(&format!("{} ", prompt)).await;
        match self.lines.lock().await.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl PatientInputSource for ConsoleInput {
    async fn get_patient_identity(&self) -> PatientIdentity {
        PatientIdentity {
            full_name: self.ask("Full name:").await,
            date_of_birth: self.ask("Date of birth (MM/DD/YYYY):").await,
        }
    }

    async fn get_insurance_info(&self) -> InsuranceInfo {
        InsuranceInfo {
            carrier: self.ask("Insurance carrier:").await,
            member_id: self.ask("Member ID:").await,
            group_number: self.ask("Group number:").await,
        }
    }

    async fn choose_slot(&self, candidates: &[Slot]) -> Option<Slot> {
        for _ in 0..MAX_CHOICE_ATTEMPTS {
            let answer = self.ask("Slot number (blank to cancel):").await;
            if answer.is_empty() {
                return None;
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=candidates.len()).contains(&n) => return candidates.get(n - 1).cloned(),
                _ => self.write(&format!("Please enter a number from 1 to {}.\n", candidates.len())).await,
            }
        }
        None
    }

    async fn announce(&self, message: &str) {
        self.write(&format!("{}\n", message)).await;
    }
}
