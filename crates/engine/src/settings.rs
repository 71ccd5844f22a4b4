//! User preferences toggled from the settings screen.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Friends,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: bool,
    pub biometric_login: bool,
    pub auto_top_up: bool,
    pub balance_visible: bool,
    pub profile_visible: bool,
    pub transaction_visibility: Visibility,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            biometric_login: false,
            auto_top_up: true,
            balance_visible: true,
            profile_visible: true,
            transaction_visibility: Visibility::Friends,
        }
    }
}

/// Partial update, `None` leaves the field as is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub biometric_login: Option<bool>,
    pub auto_top_up: Option<bool>,
    pub balance_visible: Option<bool>,
    pub profile_visible: Option<bool>,
    pub transaction_visibility: Option<Visibility>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(value) = patch.dark_mode {
            self.dark_mode = value;
        }
        if let Some(value) = patch.notifications {
            self.notifications = value;
        }
        if let Some(value) = patch.biometric_login {
            self.biometric_login = value;
        }
        if let Some(value) = patch.auto_top_up {
            self.auto_top_up = value;
        }
        if let Some(value) = patch.balance_visible {
            self.balance_visible = value;
        }
        if let Some(value) = patch.profile_visible {
            self.profile_visible = value;
        }
        if let Some(value) = patch.transaction_visibility {
            self.transaction_visibility = value;
        }
    }
}
