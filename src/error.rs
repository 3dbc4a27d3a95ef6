use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the view driver
#[derive(Error, Debug)]
pub enum Error {
    #[error("template not exists: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "minijinja-engine")]
impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        use std::error::Error as _;

        // Keep the full cause chain, loader IO errors live there
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        Self::Template(message)
    }
}

impl Error {
    pub fn template_not_found(path: impl AsRef<Path>) -> Self {
        Self::TemplateNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check whether this error means the template could not be located
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TemplateNotFound { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::TemplateNotFound { .. } => "E_TEMPLATE_NOT_FOUND",
            Error::Template(_) => "E_TEMPLATE",
            Error::Config(_) => "E_CONFIG",
            Error::Json(_) => "E_JSON",
            Error::Io(_) => "E_IO",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::TemplateNotFound { .. } => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_message() {
        let err = Error::template_not_found("/srv/app/view/index/index.html");
        assert_eq!(
            err.to_string(),
            "template not exists: /srv/app/view/index/index.html"
        );
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "E_TEMPLATE_NOT_FOUND");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = Error::config("auto_rule must be 1, 2 or 3");
        assert!(!err.is_not_found());
        assert_eq!(err.error_code(), "E_CONFIG");
        assert_eq!(err.status_code(), 500);
    }
}
