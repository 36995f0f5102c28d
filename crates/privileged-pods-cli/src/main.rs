use std::process;

use anyhow::{Result, anyhow};
use clap::ArgMatches;
use privileged_pods::{AdmissionRequest, AdmissionResponse};
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod config;

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    let log_fmt = matches
        .get_one::<String>("log-fmt")
        .map(String::as_str)
        .unwrap_or("text");
    let log_no_color = matches.get_flag("log-no-color");
    setup_tracing(log_level, log_fmt, log_no_color)?;

    match matches.subcommand() {
        Some(("validate", matches)) => validate(matches),
        Some(("validate-settings", matches)) => validate_settings(matches),
        Some((command, _)) => Err(anyhow!("unknown subcommand: {command}")),
        None => Err(anyhow!("a subcommand is required")),
    }
}

fn validate(matches: &ArgMatches) -> Result<()> {
    let config = config::policy_config(matches)?;
    let raw_request = config::read_request(matches)?;

    let outcome = AdmissionRequest::from_slice(&raw_request)
        .and_then(|request| privileged_pods::validate(&config, &request));
    match outcome {
        Ok(response) => {
            info!(accepted = response.accepted, "request evaluated");
            print_response(&response)
        }
        Err(err) => {
            // fail closed: requests that cannot be evaluated are rejected
            error!(error = %err, "cannot evaluate request");
            print_response(&AdmissionResponse::reject(format!(
                "Cannot parse validation request: {err}"
            )))?;
            process::exit(1);
        }
    }
}

fn validate_settings(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<std::path::PathBuf>("settings-path")
        .ok_or_else(|| anyhow!("missing settings path"))?;

    let response = match config::read_settings(path) {
        Ok(settings) => match settings.validate() {
            Ok(()) => AdmissionResponse::accept(),
            Err(err) => AdmissionResponse::reject(err.to_string()),
        },
        Err(err) => AdmissionResponse::reject(err.to_string()),
    };
    info!(valid = response.accepted, "settings validated");

    print_response(&response)
}

fn print_response(response: &AdmissionResponse) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}

// Logs are written to stderr, stdout is reserved to the policy response.
fn setup_tracing(log_level: &str, log_fmt: &str, log_no_color: bool) -> Result<()> {
    let filter_layer = EnvFilter::new(log_level);

    match log_fmt {
        "json" => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "text" => {
            let layer = fmt::layer()
                .with_ansi(!log_no_color)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter_layer)
                .with(layer)
                .init()
        }
        _ => return Err(anyhow!("Unknown log message format")),
    };

    Ok(())
}
