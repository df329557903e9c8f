//! Translation error types

use thiserror::Error;

/// Errors raised while translating a building description.
///
/// Every variant except the I/O and decoding ones describes a problem with
/// the input document itself; see [`TranslateError::is_translation_error`].
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Can't find element {path}")]
    ElementNotFound { path: String },

    #[error("{0}")]
    Translation(String),

    #[error("{construction} R-value {value} outside HEScore bounds, {construction} id: {id}")]
    RoundOutOfBounds {
        construction: String,
        id: String,
        value: f64,
    },

    #[error(
        "Every {construction} insulation layer needs a NominalRValue or \
         AssemblyEffectiveRValue needs to be defined, {construction} id: {id}"
    )]
    MissingRValue { construction: String, id: String },

    #[error(
        "Heating system \"{heating}\" and cooling system \"{cooling}\" are attached to the same \
         distribution system \"{distribution}\" and need to serve the same fraction of the load \
         within 5% but do not"
    )]
    InconsistentHvacWeight {
        heating: String,
        cooling: String,
        distribution: String,
    },

    #[error("No hvac system found.")]
    NoHvacSystem,

    #[error("{name} is out of bounds: {value}")]
    InputOutOfBounds { name: String, value: String },

    #[error("Schema version {0} not supported")]
    UnsupportedSchemaVersion(String),

    #[error("Lookup table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TranslateError {
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ElementNotFound { path: path.into() }
    }

    pub fn out_of_bounds(name: impl Into<String>, value: impl ToString) -> Self {
        Self::InputOutOfBounds {
            name: name.into(),
            value: value.to_string(),
        }
    }

    /// Whether this is a recognized problem with the input document, as
    /// opposed to an environment failure (unreadable file, broken table).
    pub fn is_translation_error(&self) -> bool {
        !matches!(
            self,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Table(_)
        )
    }

    /// Short variant name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound { .. } => "ElementNotFoundError",
            Self::Translation(_) => "TranslationError",
            Self::RoundOutOfBounds { .. } => "RoundOutOfBoundsError",
            Self::MissingRValue { .. } => "MissingRValueError",
            Self::InconsistentHvacWeight { .. } => "TranslationError",
            Self::NoHvacSystem => "NoHVACSystemError",
            Self::InputOutOfBounds { .. } => "InputOutOfBoundsError",
            Self::UnsupportedSchemaVersion(_) => "UnsupportedSchemaVersionError",
            Self::Table(_) => "TableError",
            Self::Io(_) => "IoError",
            Self::Json(_) => "JsonError",
            Self::Yaml(_) => "YamlError",
        }
    }
}

/// Result type for translation operations
pub type TranslateResult<T> = Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_not_found_names_the_path() {
        let err = TranslateError::not_found("Building/BuildingID/@id");
        assert_eq!(err.to_string(), "Can't find element Building/BuildingID/@id");
    }

    #[test]
    fn out_of_bounds_message() {
        let err = TranslateError::out_of_bounds("number_bedrooms", 12);
        assert_eq!(err.to_string(), "number_bedrooms is out of bounds: 12");
    }

    #[test]
    fn io_errors_are_not_translation_errors() {
        let io = TranslateError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_translation_error());
        assert!(TranslateError::NoHvacSystem.is_translation_error());
        assert!(TranslateError::UnsupportedSchemaVersion("4.0".into()).is_translation_error());
    }
}
