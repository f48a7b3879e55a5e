use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{MigrationError, MigrationResult};
use crate::models::ProcessPayload;

/// Write the payload as pretty JSON, creating parent folders
pub fn save_payload(path: &Path, payload: &ProcessPayload) -> MigrationResult<()> {
    if let Some(folder) = path.parent().filter(|folder| !folder.as_os_str().is_empty()) {
        fs::create_dir_all(folder).map_err(|e| {
            MigrationError::Export(format!("Failed to create folder '{}': {}", folder.display(), e))
        })?;
    }

    let json = serde_json::to_string_pretty(payload)
        .map_err(|e| MigrationError::Export(format!("Failed to serialize process payload: {}", e)))?;

    fs::write(path, json).map_err(|e| {
        MigrationError::Export(format!("Failed to write process payload to '{}': {}", path.display(), e))
    })
}

pub fn load_payload(path: &Path) -> MigrationResult<ProcessPayload> {
    if !path.exists() {
        return Err(MigrationError::Import(format!(
            "Process payload file '{}' does not exist.",
            path.display()
        )));
    }

    debug!("Start read process payload from '{}'.", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        MigrationError::Import(format!("Failed to read process payload '{}': {}", path.display(), e))
    })?;

    let payload = serde_json::from_str(&content).map_err(|e| {
        MigrationError::Import(format!("Process payload '{}' is not valid: {}", path.display(), e))
    })?;
    debug!("Complete read process payload.");

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomizationType, ProcessInfo};
    use tempfile::TempDir;

    fn payload() -> ProcessPayload {
        ProcessPayload::new(ProcessInfo {
            name: "Agile Custom".into(),
            reference_name: None,
            type_id: Some("source-id".into()),
            parent_process_type_id: Some("adcc42ab-9882-485e-a3ed-7678f01f66bc".into()),
            description: None,
            customization_type: CustomizationType::Inherited,
            is_enabled: true,
            is_default: false,
        })
    }

    #[test]
    fn test_save_creates_folders() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output").join("nested").join("process.json");

        save_payload(&path, &payload()).unwrap();
        assert_eq!(load_payload(&path).unwrap(), payload());
    }

    #[test]
    fn test_missing_file_is_import_error() {
        let dir = TempDir::new().unwrap();
        let err = load_payload(&dir.path().join("absent.json")).unwrap_err();

        assert!(matches!(err, MigrationError::Import(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_invalid_json_is_import_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_payload(&path), Err(MigrationError::Import(_))));
    }
}
