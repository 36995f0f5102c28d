//! Admission decision engine that only lets trusted users and groups
//! schedule Pods running with a privileged security context.
//!
//! The crate knows nothing about how requests reach it: host adapters
//! decode the admission request, build a [`PolicyConfig`] once and call
//! [`validate`] for every request.

pub mod admission_request;
pub mod admission_response;
pub mod errors;
pub mod policy_config;
pub mod settings;
mod validate;

pub use admission_request::{AdmissionRequest, Operation};
pub use admission_response::AdmissionResponse;
pub use errors::{PolicyError, SettingsError};
pub use policy_config::PolicyConfig;
pub use settings::Settings;
pub use validate::{REJECTION_MESSAGE, has_privileged_context, validate};
