use std::fmt;

use k8s_openapi::api::authentication::v1::UserInfo;
use serde::{Deserialize, Serialize};

use crate::errors::{PolicyError, Result};

/// The subset of a Kubernetes `AdmissionRequest` the policy looks at.
///
/// Unknown fields are ignored. The `object` is kept as raw JSON: it is
/// decoded into a [`PodSpec`] only once the request is known to target a
/// Pod, see [`AdmissionRequest::pod_spec`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_kind: Option<GroupVersionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<serde_json::Value>,
}

impl AdmissionRequest {
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(PolicyError::InvalidRequest)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(PolicyError::InvalidRequest)
    }

    pub fn kind(&self) -> Result<&str> {
        self.request_kind
            .as_ref()
            .map(|gvk| gvk.kind.as_str())
            .ok_or(PolicyError::MissingField("requestKind"))
    }

    /// Decode `object.spec` as a Pod specification.
    pub fn pod_spec(&self) -> Result<PodSpec> {
        let object = self
            .object
            .as_ref()
            .filter(|object| !object.is_null())
            .ok_or(PolicyError::MissingField("object"))?;
        let spec = object
            .get("spec")
            .ok_or(PolicyError::MissingField("object.spec"))?;

        PodSpec::deserialize(spec).map_err(PolicyError::InvalidPodSpec)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
}

/// Operation performed by the admission request.
///
/// Values outside of the Kubernetes vocabulary are kept verbatim, they
/// are never a parsing error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
    Other(String),
}

impl Operation {
    pub fn is_create_or_update(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl From<String> for Operation {
    fn from(operation: String) -> Self {
        match operation.as_str() {
            "CREATE" => Operation::Create,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            "CONNECT" => Operation::Connect,
            _ => Operation::Other(operation),
        }
    }
}

impl From<Operation> for String {
    fn from(operation: Operation) -> String {
        match operation {
            Operation::Other(operation) => operation,
            known => known.to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
            Operation::Other(operation) => operation,
        };
        f.write_str(operation)
    }
}

// Only the privilege related bits of a Pod are modeled. The Pod level
// context also carries `privileged`, which the upstream
// `PodSecurityContext` type does not know about.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_containers: Option<Vec<Container>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
}

impl SecurityContext {
    pub fn is_privileged(&self) -> bool {
        self.privileged.unwrap_or(false)
    }
}

impl Container {
    pub fn is_privileged(&self) -> bool {
        self.security_context
            .as_ref()
            .is_some_and(SecurityContext::is_privileged)
    }
}
