//! File logger with console echo
//!
//! Every record goes to the log file, records at or above the configured
//! level are echoed to stdout as well.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use log::{Level, LevelFilter};

pub fn init(log_file: &Path, console_level: LevelFilter) -> Result<()> {
    if let Some(folder) = log_file.parent().filter(|folder| !folder.as_os_str().is_empty()) {
        fs::create_dir_all(folder).with_context(|| format!("Failed to create log directory: {:?}", folder))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {:?}", log_file))?;

    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .format(move |buf, record| {
            let line = format_line(record.level(), &Utc::now(), &record.args().to_string());
            if record.level() <= console_level {
                println!("{}", colorize(record.level(), &line));
            }
            writeln!(buf, "{}", line)
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Failed to initialize logger")?;

    Ok(())
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFORMATION",
        Level::Debug | Level::Trace => "VERBOSE",
    }
}

fn format_line(level: Level, timestamp: &DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        level_name(level),
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

fn colorize(level: Level, line: &str) -> String {
    match level {
        Level::Error => line.red().to_string(),
        Level::Warn => line.yellow().to_string(),
        _ => line.to_string(),
    }
}
