// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "INVTRACK_LOG";
pub const LOG_FILE_NAME: &str = "invtrack.log";

/// Route `tracing` output to `<dir>/invtrack.log`. The terminal belongs to
/// the UI, so nothing is written to stdout or stderr. Keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init_logging(config: &Config) -> Result<(WorkerGuard, PathBuf)> {
    let dir = config.log_dir()?;
    let guard = init_logging_in(&dir, config.log_level())?;
    Ok((guard, dir.join(LOG_FILE_NAME)))
}

fn init_logging_in(dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir).with_context(|| format!("create log directory {}", dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)
        .with_context(|| format!("open log file in {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level)?)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(guard)
}

fn env_filter(default_level: &str) -> Result<EnvFilter> {
    match env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}")),
        _ => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log.level {default_level:?}")),
    }
}
