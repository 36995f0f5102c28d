use serde::{Deserialize, Serialize};

/// Outcome of the evaluation of an admission request.
///
/// `message` is empty when the request is accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResponse {
    pub accepted: bool,
    pub message: String,
}

impl AdmissionResponse {
    pub fn accept() -> Self {
        AdmissionResponse {
            accepted: true,
            message: String::new(),
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        AdmissionResponse {
            accepted: false,
            message: message.into(),
        }
    }
}
