use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use log::{debug, error, info};

use process_migrator::cli::{self, Cli};
use process_migrator::commands;
use process_migrator::config::Config;
use process_migrator::engine::CancellationToken;
use process_migrator::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let start = Instant::now();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            return ExitCode::from(1);
        }
    };
    config.apply_token_overrides(cli.source_token.clone(), cli.target_token.clone());

    if let Err(e) = logging::init(&config.options.log_filename, config.options.log_level.level_filter()) {
        eprintln!("{}", format!("{:#}", e).red());
        return ExitCode::from(1);
    }
    info!("Full log is sent to '{}'", config.options.log_filename.display());

    if let Err(e) = config.validate(cli.mode) {
        error!("{}", e);
        return ExitCode::from(1);
    }

    let cancellation = CancellationToken::new();
    cli::start_cancellation_listener(cancellation.clone());
    let engine = config.engine(cancellation);

    let code = match commands::run(cli.mode, &config, &engine, cli.overwrite_process_on_target).await {
        Ok(()) => {
            info!("Total elapsed time: '{:.3}' seconds.", start.elapsed().as_secs_f64());
            0
        }
        Err(e) if e.is_known() => {
            error!("{}", e);
            e.exit_code()
        }
        Err(e) => {
            debug!("{:?}", e);
            error!("Encountered unknown error, check log file for details.");
            e.exit_code()
        }
    };

    // The stdin listener may still be blocked on a read, do not wait for it
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if !cli.config.exists() {
        if let Some(generated) = Config::generate_default_template(&cli.config)? {
            println!("Generated default configuration file as '{}'.", generated.display());
        }
        anyhow::bail!("Cannot find configuration file '{}'", cli.config.display());
    }

    Config::load(&cli.config)
}
