//! Error types for the splitter.
//!
//! Every failure is fatal to a run. Files written before the failure stay on
//! disk; callers can tell the kinds apart by matching on [`SplitterError`].

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the splitter library.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// The source document does not exist.
    #[error("The given XML file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML reader reported a parse error while scanning.
    #[error("Malformed XML at byte {position}: {source}")]
    MalformedInput {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// The document ended before the closing tag of a match.
    #[error("Unexpected end of document inside <{tag}> (started at byte {position})")]
    UnexpectedEof { tag: String, position: u64 },

    /// The document contains no element at all.
    #[error("Document contains no element")]
    EmptyDocument,

    /// The naming strategy could not derive a name for a match.
    #[error("Cannot name match #{match_index} using {strategy}: {reason}")]
    NameResolution {
        strategy: String,
        reason: String,
        match_index: u64,
    },

    /// A derived file name would place the output outside the output directory.
    #[error("Derived name '{0}' points outside the output directory")]
    OutputNameOutsideDir(String),

    /// A tag or attribute name given as configuration is not a valid XML name.
    #[error("Invalid XML name: '{0}'")]
    InvalidTagName(String),

    /// Writing an output file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplitterError {
    /// Whether this error was caused by the input document not being well-formed.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            SplitterError::MalformedInput { .. } | SplitterError::UnexpectedEof { .. }
        )
    }
}

/// Result type alias for splitter operations.
pub type Result<T> = std::result::Result<T, SplitterError>;
