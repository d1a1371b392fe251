use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mapscript operations
#[derive(Error, Diagnostic, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mapscript::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mapscript::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(mapscript::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Could not resolve '{address}': {reason}")]
    #[diagnostic(
        code(mapscript::resolve),
        help("Add the address to the `places` table or use a [lat, lng] pair")
    )]
    Resolution { address: String, reason: String },

    #[error("Unsupported entity type '{kind}'")]
    #[diagnostic(code(mapscript::unsupported))]
    UnsupportedEntity {
        kind: String,
        #[help]
        help: Option<String>,
    },

    #[error("Malformed input: {message}")]
    #[diagnostic(code(mapscript::malformed))]
    MalformedInput {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Render error: {message}")]
    #[diagnostic(code(mapscript::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(mapscript::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(mapscript::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl MapError {
    /// Shorthand for a render error without help text.
    pub fn render(message: impl Into<String>) -> Self {
        MapError::Render {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
