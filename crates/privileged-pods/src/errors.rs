use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Structural problems found while evaluating an admission request.
///
/// These abort the evaluation of the current request. Deciding whether
/// the request should then be accepted or rejected is up to the host.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("admission request is missing the '{0}' field")]
    MissingField(&'static str),

    #[error("invalid admission request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("cannot decode Pod spec: {0}")]
    InvalidPodSpec(#[source] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("trusted_users cannot contain empty user names")]
    EmptyTrustedUser,

    #[error("trusted_groups cannot contain empty group names")]
    EmptyTrustedGroup,
}
