use thiserror::Error;

/// Errors that can occur while loading or validating a bundle document.
///
/// Graph derivation and layout never produce these: once a bundle is loaded,
/// every data-shape anomaly degrades to a default instead of an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BundleError {
    #[error("Could not read bundle file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse bundle JSON: {0}")]
    JsonParseError(String),

    #[error("Unsupported bundle version {0}, expected 1 or 2")]
    UnsupportedVersion(u64),

    #[error("Bundle is missing the 'exportedAt' timestamp")]
    MissingExportedAt,

    #[error("Bundle does not contain any objects")]
    NoObjects,

    #[error("Bundle does not contain a workflow object with a 'tasks' array")]
    NoWorkflow,

    #[error("Version 1 bundles require a 'references' map")]
    MissingReferences,
}

/// Errors that can occur when loading a layout configuration file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse layout config: {0}")]
    JsonParseError(String),
}
