//! Errors produced while loading collector settings.

use thiserror::Error;

/// Errors for the settings module.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The settings file could not be read or parsed.
    #[error("invalid settings file `{file}` - {message}")]
    InvalidSettings {
        /// The path to the settings file.
        file: String,
        /// The error message.
        message: String,
    },

    /// A loaded settings struct failed its `validator::Validate` checks.
    #[error("settings file `{file}` failed validation - {message}")]
    Invalid {
        /// The path to the settings file.
        file: String,
        /// The validation error message.
        message: String,
    },
}
