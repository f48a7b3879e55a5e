//! Error kinds surfaced by export, validation and import

use log::error;
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Process import/export cancelled by user input.")]
    Cancelled,

    /// Nothing has been created on the destination yet
    #[error("Process import validation failed. {0}")]
    Validation(String),

    #[error("Export failed, see log file for details. {0}")]
    Export(String),

    /// Artifacts created before the failure stay on the destination
    #[error("Import failed, see log file for details. {0}")]
    Import(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Cancelled,
    Validation,
    Export,
    Import,
    Unknown,
}

impl MigrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::Cancelled => ErrorKind::Cancelled,
            MigrationError::Validation(_) => ErrorKind::Validation,
            MigrationError::Export(_) => ErrorKind::Export,
            MigrationError::Import(_) => ErrorKind::Import,
            MigrationError::Api(_) => ErrorKind::Unknown,
        }
    }

    /// Known errors carry a message fit for the console
    pub fn is_known(&self) -> bool {
        self.kind() != ErrorKind::Unknown
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            MigrationError::Cancelled => 2,
            _ => 1,
        }
    }
}

/// Attach a step message to a failure, keeping known errors intact.
///
/// Unknown errors (remote failures) are logged in full and replaced by an
/// [`MigrationError::Import`] or [`MigrationError::Export`] with the message.
pub trait StepContext<T> {
    fn import_context<F>(self, message: F) -> MigrationResult<T>
    where
        F: FnOnce() -> String;

    fn export_context<F>(self, message: F) -> MigrationResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> StepContext<T> for Result<T, E>
where
    E: Into<MigrationError>,
{
    fn import_context<F>(self, message: F) -> MigrationResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap_unknown(e.into(), message, MigrationError::Import))
    }

    fn export_context<F>(self, message: F) -> MigrationResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap_unknown(e.into(), message, MigrationError::Export))
    }
}

fn wrap_unknown<F>(error: MigrationError, message: F, wrap: fn(String) -> MigrationError) -> MigrationError
where
    F: FnOnce() -> String,
{
    if error.is_known() {
        return error;
    }

    error!("{}", error);
    wrap(message())
}
