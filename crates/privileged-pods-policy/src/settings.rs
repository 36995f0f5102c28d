use serde::{Deserialize, Serialize};

// The settings document is owned by the engine crate, this wrapper only
// plugs it into the Kubewarden settings validation protocol.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(transparent)]
pub(crate) struct Settings(pub privileged_pods::Settings);

impl kubewarden::settings::Validatable for Settings {
    fn validate(&self) -> Result<(), String> {
        self.0.validate().map_err(|e| e.to_string())
    }
}
