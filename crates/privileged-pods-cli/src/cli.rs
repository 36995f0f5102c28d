use std::path::PathBuf;

use clap::{
    Arg, ArgAction, Command,
    builder::{FalseyValueParser, PossibleValuesParser},
    crate_authors, crate_description, crate_name, crate_version, value_parser,
};

fn subcommand_validate() -> Command {
    let mut args = vec![
        Arg::new("request-path")
            .long("request-path")
            .short('r')
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("File containing the Kubernetes admission request object in JSON format. Read from stdin when omitted"),
        Arg::new("settings-path")
            .long("settings-path")
            .short('s')
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("JSON or YAML file holding the policy settings. Takes precedence over the trusted users and groups lists"),
        Arg::new("trusted-users")
            .long("trusted-users")
            .value_name("USERS")
            .env("TRUSTED_USERS")
            .help("Comma separated list of users allowed to schedule privileged Pods"),
        Arg::new("trusted-groups")
            .long("trusted-groups")
            .value_name("GROUPS")
            .env("TRUSTED_GROUPS")
            .help("Comma separated list of groups allowed to schedule privileged Pods"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new("validate")
        .about("Evaluates an admission request and prints the policy response")
        .args(args)
}

fn subcommand_validate_settings() -> Command {
    Command::new("validate-settings")
        .about("Checks whether a settings document can be used by the policy")
        .arg(
            Arg::new("settings-path")
                .long("settings-path")
                .short('s')
                .required(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("JSON or YAML file holding the policy settings"),
        )
}

pub(crate) fn build_cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LOG_LEVEL")
                .env("PRIVILEGED_PODS_LOG_LEVEL")
                .default_value("info")
                .value_parser(PossibleValuesParser::new([
                    "trace", "debug", "info", "warn", "error",
                ]))
                .global(true)
                .help("Log level"),
        )
        .arg(
            Arg::new("log-fmt")
                .long("log-fmt")
                .value_name("LOG_FMT")
                .env("PRIVILEGED_PODS_LOG_FMT")
                .default_value("text")
                .value_parser(PossibleValuesParser::new(["text", "json"]))
                .global(true)
                .help("Log output format"),
        )
        .arg(
            Arg::new("log-no-color")
                .long("log-no-color")
                .env("NO_COLOR")
                .action(ArgAction::SetTrue)
                .value_parser(FalseyValueParser::new())
                .global(true)
                .help("Disable colored output for logs"),
        )
        .subcommands([subcommand_validate(), subcommand_validate_settings()])
        .subcommand_required(true)
        .arg_required_else_help(true)
}
