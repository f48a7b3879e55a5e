use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_CONFIG_FILENAME: &str = "configuration.json";

#[derive(Parser, Debug)]
#[command(name = "process-migrator")]
#[command(version)]
#[command(about = "Export, import or migrate an inherited work item process between Azure DevOps organizations")]
pub struct Cli {
    /// What to run; migrate exports from the source then imports into the target
    #[arg(short, long, value_enum, default_value_t = Mode::Migrate)]
    pub mode: Mode,

    /// Configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Personal access token for the source account, overrides the configuration file
    #[arg(long)]
    pub source_token: Option<String>,

    /// Personal access token for the target account, overrides the configuration file
    #[arg(long)]
    pub target_token: Option<String>,

    /// Delete a same-named process on the target before importing
    #[arg(long)]
    pub overwrite_process_on_target: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Export,
    Import,
    #[value(alias = "both")]
    Migrate,
}

impl Mode {
    pub fn exports(self) -> bool {
        matches!(self, Mode::Export | Mode::Migrate)
    }

    pub fn imports(self) -> bool {
        matches!(self, Mode::Import | Mode::Migrate)
    }
}
