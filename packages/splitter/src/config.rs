//! Configuration constants, input validation and the run configuration.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SplitterError};
use crate::naming::NamingStrategy;

/// Directory created under the platform temp root when no output directory is given.
pub const OUTPUT_ROOT_DIR_NAME: &str = "xml_splitter_output";

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "xml";

/// Number used for the first file under sequential naming.
pub const FIRST_FILE_NUMBER: u64 = 1;

/// XML name: a letter, underscore or colon followed by name characters
/// (letters, combining marks, digits, connector punctuation, `_:.-` and `·`).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static XML_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_:][\p{L}\p{M}\p{N}\p{Pc}_:.\-\x{B7}]*$").expect("valid regex")
});

/// Validate that a tag or attribute name is a plausible XML name.
///
/// Matching is exact and case-sensitive later on, so this only rejects names
/// that can never occur in a well-formed document (empty, whitespace, markup).
///
/// # Examples
/// ```
/// use xml_splitter::config::validate_name;
///
/// assert!(validate_name("item").is_ok());
/// assert!(validate_name("dc:title").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("<item>").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if XML_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(SplitterError::InvalidTagName(name.to_string()))
    }
}

/// Default output directory for a source document.
///
/// `<temp root>/xml_splitter_output/<file name without a trailing .xml>`.
/// Only the `.xml` suffix is stripped; `dump.xml.bak` keeps its full name.
pub fn default_output_dir(source: &Path) -> PathBuf {
    std::env::temp_dir()
        .join(OUTPUT_ROOT_DIR_NAME)
        .join(source_stem(source))
}

fn source_stem(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.strip_suffix(".xml") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name,
    }
}

/// Immutable configuration for one split run.
///
/// The output directory is resolved when the configuration is created, so a
/// run never consults the environment halfway through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    /// Document to split.
    pub source: PathBuf,

    /// Element name to split on (exact, case-sensitive).
    pub tag: String,

    /// How output files are named.
    pub naming: NamingStrategy,

    /// Directory receiving the output files.
    pub output_dir: PathBuf,
}

impl SplitConfig {
    /// Create a configuration with sequential naming and the default output directory.
    ///
    /// # Errors
    /// Returns `SplitterError::InvalidTagName` if `tag` is not a valid XML name.
    pub fn new(source: impl Into<PathBuf>, tag: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let tag = tag.into();
        validate_name(&tag)?;

        let output_dir = default_output_dir(&source);
        Ok(Self {
            source,
            tag,
            naming: NamingStrategy::Sequential,
            output_dir,
        })
    }

    /// Set the naming strategy.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}
