// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use invtrack_app::InventoryState;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

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

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `invtrack --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let base_url = options
        .api_base
        .clone()
        .unwrap_or_else(|| config.api_base_url());
    let client = invtrack_api::Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid API settings; fix --api-base, {} or [api] in {}",
            invtrack_api::BASE_URL_ENV,
            options.config_path.display()
        )
    })?;

    let (_log_guard, log_path) = logging::init_logging(&config)?;
    info!(
        base_url = client.base_url(),
        log = %log_path.display(),
        "invtrack starting"
    );

    if options.check_only {
        client.health()?;
        println!("ok: inventory API at {} is healthy", client.base_url());
        return Ok(());
    }

    let mut state = InventoryState::default();
    let mut runtime = ApiRuntime::new(client);
    let result = invtrack_tui::run_app(&mut state, &mut runtime);
    info!(ok = result.is_ok(), "invtrack exiting");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_base: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        api_base: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--api-base" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--api-base requires a URL"))?;
                options.api_base = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("invtrack: terminal client for the inventory API");
    println!("  --config <path>          Use a specific config path");
    println!("  --api-base <url>         API base URL (beats INVTRACK_API_BASE and config)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and probe GET /health");
    println!("  --help                   Show this help");
    println!();
    println!("Logs go to invtrack.log in the data dir; set INVTRACK_LOG to filter.");
}
