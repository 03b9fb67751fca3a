//! Destructive-action confirmation seam.

use std::sync::Mutex;

use async_trait::async_trait;

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync + 'static {
    /// Show `prompt`; `true` means the user accepted.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way and records what was asked.
///
/// Useful for unattended runs and tests.
#[derive(Debug)]
pub struct FixedConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FixedConfirm {
    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn declining() -> Self {
        Self::new(false)
    }

    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Confirm for FixedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answer
    }
}
