use lazy_static::lazy_static;
use serde::Deserialize;

use guest::prelude::*;
use kubewarden_policy_sdk::wapc_guest as guest;

extern crate kubewarden_policy_sdk as kubewarden;
use kubewarden::{logging, protocol_version_guest, validate_settings};

use privileged_pods::{AdmissionRequest, PolicyConfig};

mod settings;
use settings::Settings;

use slog::{info, o, warn, Logger};

lazy_static! {
    static ref LOG_DRAIN: Logger = Logger::root(
        logging::KubewardenDrain::new(),
        o!("policy" => "privileged-pods")
    );
}

#[unsafe(no_mangle)]
pub extern "C" fn wapc_init() {
    register_function("validate", validate);
    register_function("validate_settings", validate_settings::<Settings>);
    register_function("protocol_version", protocol_version_guest);
}

// Envelope sent by the Kubewarden host to the `validate` function. The SDK
// `ValidationRequest` is not used: it decodes into its own request type,
// while this one decodes straight into the engine's typed request.
#[derive(Deserialize)]
struct ValidationPayload {
    request: AdmissionRequest,
    #[serde(default)]
    settings: Settings,
}

fn validate(payload: &[u8]) -> CallResult {
    let payload: ValidationPayload = match serde_json::from_slice(payload) {
        Ok(payload) => payload,
        Err(err) => return reject_unparsable(err),
    };
    let request = &payload.request;
    let config = PolicyConfig::from(&payload.settings.0);

    match privileged_pods::validate(&config, request) {
        Ok(response) if response.accepted => kubewarden::accept_request(),
        Ok(response) => {
            info!(
                LOG_DRAIN,
                "rejecting privileged Pod";
                "uid" => request.uid.as_deref().unwrap_or_default(),
                "namespace" => request.namespace.as_deref().unwrap_or_default(),
                "name" => request.name.as_deref().unwrap_or_default()
            );
            kubewarden::reject_request(Some(response.message), None, None, None)
        }
        Err(err) => reject_unparsable(err),
    }
}

// Requests that cannot be evaluated are rejected: a privileged Pod must
// never slip through because of a malformed request.
fn reject_unparsable(err: impl std::fmt::Display) -> CallResult {
    warn!(LOG_DRAIN, "cannot evaluate request"; "error" => err.to_string());
    kubewarden::reject_request(
        Some(format!("Cannot parse validation request: {err}")),
        None,
        None,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{json, Value};

    fn fixture(name: &str) -> Value {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join(name);
        let contents = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
        serde_json::from_str(&contents).unwrap()
    }

    fn evaluate(request: Value, settings: Value) -> (bool, String) {
        let payload = json!({
            "request": request,
            "settings": settings,
        });
        let raw = validate(&serde_json::to_vec(&payload).unwrap()).unwrap();
        let response: Value = serde_json::from_slice(&raw).unwrap();

        let accepted = response["accepted"].as_bool().unwrap();
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        (accepted, message)
    }

    #[rstest]
    #[case::not_a_pod("config_map_creation.json")]
    #[case::pod_deletion("pod_deletion.json")]
    #[case::unprivileged_pod("pod_creation_unprivileged.json")]
    fn accept_without_trust_policy(#[case] request: &str) {
        let (accepted, message) = evaluate(fixture(request), json!({}));

        assert!(accepted);
        assert!(message.is_empty());
    }

    #[rstest]
    #[case::privileged_container("pod_creation_privileged_container.json")]
    #[case::privileged_pod("pod_creation_privileged_pod.json")]
    #[case::privileged_init_container("pod_update_privileged_init_container.json")]
    fn reject_untrusted_privileged_pods(#[case] request: &str) {
        let (accepted, message) = evaluate(
            fixture(request),
            json!({
                "trusted_users": ["alice"],
                "trusted_groups": ["system:masters"],
            }),
        );

        assert!(!accepted);
        assert_eq!(message, "User cannot schedule privileged containers");
    }

    #[rstest]
    #[case::trusted_user(json!({"trusted_users": ["bob"]}))]
    #[case::trusted_group(json!({"trusted_groups": ["tenant-a-admins"]}))]
    fn accept_trusted_privileged_pods(#[case] settings: Value) {
        let (accepted, message) =
            evaluate(fixture("pod_creation_privileged_container.json"), settings);

        assert!(accepted);
        assert!(message.is_empty());
    }

    #[test]
    fn skip_init_containers() {
        let (accepted, _) = evaluate(
            fixture("pod_update_privileged_init_container.json"),
            json!({"skip_init_containers": true}),
        );

        assert!(accepted);
    }

    #[test]
    fn missing_settings_trust_nobody() {
        let payload = json!({
            "request": fixture("pod_creation_privileged_container.json"),
        });
        let raw = validate(&serde_json::to_vec(&payload).unwrap()).unwrap();
        let response: Value = serde_json::from_slice(&raw).unwrap();

        assert_eq!(response["accepted"], json!(false));
    }

    #[test]
    fn reject_privileged_pod_without_user_info() {
        let (accepted, message) = evaluate(
            fixture("pod_creation_without_user_info.json"),
            json!({"trusted_users": ["bob"]}),
        );

        assert!(!accepted);
        assert_eq!(
            message,
            "Cannot parse validation request: admission request is missing the 'userInfo' field"
        );
    }

    #[test]
    fn reject_malformed_payload() {
        let raw = validate(b"{\"request\": {\"requestKind\": 42}}").unwrap();
        let response: Value = serde_json::from_slice(&raw).unwrap();

        assert_eq!(response["accepted"], json!(false));
        assert!(response["message"]
            .as_str()
            .unwrap()
            .starts_with("Cannot parse validation request"));
    }
}
