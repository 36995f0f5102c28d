use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// Settings document accepted by the policy.
///
/// Every field is optional: a missing list means nobody is trusted.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub trusted_users: Vec<String>,
    pub trusted_groups: Vec<String>,
    pub skip_init_containers: bool,
    pub skip_ephemeral_containers: bool,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.trusted_users.iter().any(String::is_empty) {
            return Err(SettingsError::EmptyTrustedUser);
        }
        if self.trusted_groups.iter().any(String::is_empty) {
            return Err(SettingsError::EmptyTrustedGroup);
        }

        Ok(())
    }
}
