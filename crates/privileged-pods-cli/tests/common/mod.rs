use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;

#[allow(dead_code)]
pub fn setup_command() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("privileged-pods-cli");

    cmd.env_remove("TRUSTED_USERS")
        .env_remove("TRUSTED_GROUPS")
        .env_remove("PRIVILEGED_PODS_LOG_LEVEL")
        .env_remove("PRIVILEGED_PODS_LOG_FMT")
        .env("NO_COLOR", "1");

    cmd
}

#[allow(dead_code)]
pub fn test_data(path: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(path)
        .to_string_lossy()
        .to_string()
}
