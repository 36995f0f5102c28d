use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use privileged_pods::{PolicyConfig, Settings};
use tracing::debug;

/// Build the trust policy, either from a settings file or from the
/// comma separated lists of trusted users and groups.
pub(crate) fn policy_config(matches: &ArgMatches) -> Result<PolicyConfig> {
    if let Some(path) = matches.get_one::<PathBuf>("settings-path") {
        let settings = read_settings(path)?;
        settings
            .validate()
            .map_err(|e| anyhow!("invalid settings {}: {e}", path.display()))?;
        debug!(path = %path.display(), "trust policy loaded from settings file");
        return Ok(PolicyConfig::from(&settings));
    }

    let users = matches
        .get_one::<String>("trusted-users")
        .map(String::as_str)
        .unwrap_or_default();
    let groups = matches
        .get_one::<String>("trusted-groups")
        .map(String::as_str)
        .unwrap_or_default();
    debug!(users, groups, "trust policy loaded from delimited lists");

    Ok(PolicyConfig::from_delimited(users, groups))
}

pub(crate) fn read_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;
    parse_settings(&contents)
}

// YAML is a superset of JSON, both formats are handled here
pub(crate) fn parse_settings(contents: &str) -> Result<Settings> {
    serde_yaml::from_str(contents).map_err(|e| anyhow!("cannot parse settings: {e}"))
}

/// Raw admission request, read from `--request-path` or from stdin.
pub(crate) fn read_request(matches: &ArgMatches) -> Result<Vec<u8>> {
    match matches.get_one::<PathBuf>("request-path") {
        Some(path) => fs::read(path)
            .with_context(|| format!("cannot read request file {}", path.display())),
        None => {
            let mut request = Vec::new();
            std::io::stdin()
                .read_to_end(&mut request)
                .context("cannot read request from stdin")?;
            Ok(request)
        }
    }
}
