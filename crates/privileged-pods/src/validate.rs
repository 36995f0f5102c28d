use tracing::debug;

use crate::admission_request::{AdmissionRequest, PodSpec};
use crate::admission_response::AdmissionResponse;
use crate::errors::{PolicyError, Result};
use crate::policy_config::PolicyConfig;

/// Message of every rejection. Downstream consumers match on it, do not
/// change it.
pub const REJECTION_MESSAGE: &str = "User cannot schedule privileged containers";

const POD_KIND: &str = "Pod";

/// Decide whether the admission request can be accepted.
///
/// Only Pod `CREATE` and `UPDATE` requests are evaluated, everything else
/// is accepted. A Pod that makes use of a privileged security context is
/// accepted only when the requesting user, or one of its groups, is
/// trusted by `config`.
///
/// An `Err` is returned when the request lacks the fields required to
/// take a decision.
pub fn validate(config: &PolicyConfig, request: &AdmissionRequest) -> Result<AdmissionResponse> {
    let kind = request.kind()?;
    if kind != POD_KIND {
        debug!(kind, "not a Pod, accepting");
        return Ok(AdmissionResponse::accept());
    }

    if !request.operation.is_create_or_update() {
        debug!(operation = %request.operation, "operation not evaluated, accepting");
        return Ok(AdmissionResponse::accept());
    }

    let pod_spec = request.pod_spec()?;
    if !has_privileged_context(config, &pod_spec) {
        debug!("no privileged security context, accepting");
        return Ok(AdmissionResponse::accept());
    }

    let user_info = request
        .user_info
        .as_ref()
        .ok_or(PolicyError::MissingField("userInfo"))?;
    let username = user_info
        .username
        .as_deref()
        .ok_or(PolicyError::MissingField("userInfo.username"))?;

    if config.is_user_trusted(username) {
        debug!(username, "privileged Pod requested by trusted user");
        return Ok(AdmissionResponse::accept());
    }

    let groups = user_info.groups.as_deref().unwrap_or_default();
    if let Some(group) = groups.iter().find(|group| config.is_group_trusted(group)) {
        debug!(username, group, "privileged Pod requested by trusted group");
        return Ok(AdmissionResponse::accept());
    }

    debug!(username, ?groups, "privileged Pod requested by untrusted user");
    Ok(AdmissionResponse::reject(REJECTION_MESSAGE))
}

/// Whether the Pod itself, or any of its containers, asks to run
/// privileged. A missing `securityContext` or `privileged` field means
/// unprivileged.
pub fn has_privileged_context(config: &PolicyConfig, pod_spec: &PodSpec) -> bool {
    if pod_spec
        .security_context
        .as_ref()
        .is_some_and(|sc| sc.is_privileged())
    {
        return true;
    }

    if pod_spec.containers.iter().any(|c| c.is_privileged()) {
        return true;
    }

    if !config.skip_init_containers()
        && pod_spec
            .init_containers
            .iter()
            .flatten()
            .any(|c| c.is_privileged())
    {
        return true;
    }

    !config.skip_ephemeral_containers()
        && pod_spec
            .ephemeral_containers
            .iter()
            .flatten()
            .any(|c| c.is_privileged())
}
