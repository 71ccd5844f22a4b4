use crate::{
    notify::Severity,
    settings::{Settings, SettingsPatch},
};

use super::{Engine, Outcome};

impl Engine {
    /// Applies the toggles in `patch` and persists them.
    pub async fn update_settings(&mut self, patch: &SettingsPatch) -> Outcome {
        if patch.is_empty() {
            return Outcome::rejected("Nothing to update".to_string(), None);
        }
        self.simulate_latency().await;
        self.state.ledger.update_settings(patch);
        self.persist().await;

        let message = "Settings updated".to_string();
        self.notifier.notify(&message, Severity::Info);
        Outcome {
            success: true,
            message,
            transactions: Vec::new(),
            error: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.state.ledger.settings()
    }
}
