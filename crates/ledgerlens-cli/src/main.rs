// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use ledgerlens_api::Client;
use ledgerlens_app::{BrowserState, ResourceKind};
use ledgerlens_testkit::StaticRuntime;
use runtime::HttpRuntime;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

const DEMO_SEED: u64 = 42;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    init_logging()?;

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `ledgerlens --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let kind = options.resource.unwrap_or_else(|| config.resource());
    let deep_link = options.deep_link.as_deref();
    let browser = BrowserState::new(kind, config.page_size());

    if options.demo {
        if options.check_only {
            return Ok(());
        }
        let mut runtime = StaticRuntime::seeded(DEMO_SEED);
        return ledgerlens_tui::run_app(browser, &mut runtime, deep_link);
    }

    let client = Client::new(config.base_url(), config.timeout()?, config.page_size())
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    if options.check_only {
        return Ok(());
    }

    let mut runtime = HttpRuntime::new(client);
    ledgerlens_tui::run_app(browser, &mut runtime, deep_link)
}

fn init_logging() -> Result<()> {
    let Some(filter) = env::var_os("LEDGERLENS_LOG") else {
        return Ok(());
    };

    // The terminal belongs to the UI; logs go to a file beside the process.
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("ledgerlens.log")
        .context("open ledgerlens.log for logging")?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            filter.to_string_lossy(),
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
    resource: Option<ResourceKind>,
    deep_link: Option<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
        resource: None,
        deep_link: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--connections" => {
                options.resource = Some(ResourceKind::Connections);
            }
            "--channel" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--channel requires a channel id"))?;
                options.resource = Some(ResourceKind::Channels);
                options.deep_link = Some(value.as_ref().to_owned());
            }
            "--connection" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--connection requires a connection id"))?;
                options.resource = Some(ResourceKind::Connections);
                options.deep_link = Some(value.as_ref().to_owned());
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("ledgerlens");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --connections            Browse connections instead of channels");
    println!("  --channel <id>           Open with a channel lookup for <id>");
    println!("  --connection <id>        Open with a connection lookup for <id>");
    println!("  --demo                   Launch against seeded in-memory data");
    println!("  --check                  Validate config + client construction");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use ledgerlens_app::ResourceKind;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/ledgerlens-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                demo: false,
                check_only: false,
                show_help: false,
                resource: None,
                deep_link: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--channel"], default_options_path())
            .expect_err("missing channel id should fail");
        assert!(error.to_string().contains("--channel requires a channel id"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_channel_deep_link_selects_channels() -> Result<()> {
        let options = parse_cli_args(vec!["--channel", "Channel-42"], default_options_path())?;
        assert_eq!(options.resource, Some(ResourceKind::Channels));
        assert_eq!(options.deep_link.as_deref(), Some("Channel-42"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_connection_deep_link_selects_connections() -> Result<()> {
        let options = parse_cli_args(
            vec!["--connection", "connection-7"],
            default_options_path(),
        )?;
        assert_eq!(options.resource, Some(ResourceKind::Connections));
        assert_eq!(options.deep_link.as_deref(), Some("connection-7"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_flag_combinations() -> Result<()> {
        let options = parse_cli_args(
            vec!["--connections", "--demo", "--check"],
            default_options_path(),
        )?;
        assert_eq!(options.resource, Some(ResourceKind::Connections));
        assert!(options.demo);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
