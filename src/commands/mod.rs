//! Mode runners: export to the payload file, import from it, or both

pub mod payload_file;

use log::info;

pub use payload_file::{load_payload, save_payload};

use crate::api::{ApiResult, DevOpsClient};
use crate::cli::Mode;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{MigrationResult, StepContext};
use crate::export::ProcessExporter;
use crate::import::ProcessImporter;
use crate::models::ProcessPayload;

pub async fn run(
    mode: Mode,
    config: &Config,
    engine: &Engine,
    overwrite_process_on_target: bool,
) -> MigrationResult<()> {
    let payload = if mode.exports() {
        Some(export_command(config, engine).await?)
    } else {
        None
    };

    if mode.imports() {
        import_command(config, engine, payload, overwrite_process_on_target).await?;
    }

    Ok(())
}

/// Export the source process and write it to the payload file
pub async fn export_command(config: &Config, engine: &Engine) -> MigrationResult<ProcessPayload> {
    let url = config.source_account_url.as_deref().unwrap_or_default();
    let token = config.source_account_token.as_deref().unwrap_or_default();
    let process_name = config.source_process_name.as_deref().unwrap_or_default();

    let client = connect(url, token, config).export_context(|| connect_message(url))?;
    let exporter = ProcessExporter::new(client, engine.clone());
    let payload = exporter.export_process(process_name).await?;

    let path = &config.options.process_filename;
    engine
        .step("Write process payload to file", async { save_payload(path, &payload) })
        .await?;
    info!("Export process completed successfully to '{}'.", path.display());

    Ok(payload)
}

/// Import `payload`, or the payload file when nothing was exported in this run
pub async fn import_command(
    config: &Config,
    engine: &Engine,
    payload: Option<ProcessPayload>,
    overwrite_process_on_target: bool,
) -> MigrationResult<()> {
    let mut payload = match payload {
        Some(payload) => payload,
        None => load_payload(&config.options.process_filename)?,
    };

    let url = config.target_account_url.as_deref().unwrap_or_default();
    let token = config.target_account_token.as_deref().unwrap_or_default();

    let client = connect(url, token, config).import_context(|| connect_message(url))?;
    let importer = ProcessImporter::new(client, engine.clone(), config.import_options(overwrite_process_on_target));
    importer.import_process(&mut payload).await
}

fn connect(url: &str, token: &str, config: &Config) -> ApiResult<DevOpsClient> {
    DevOpsClient::with_monitoring(url, token, config.resilience().monitoring)
}

fn connect_message(url: &str) -> String {
    format!(
        "Failed to connect to account '{}' using personal access token '<omitted>' provided, check url and token.",
        url
    )
}
