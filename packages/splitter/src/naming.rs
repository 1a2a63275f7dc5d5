//! Deriving output file names from extracted elements.

use std::fmt;

use crate::config::{validate_name, FIRST_FILE_NUMBER};
use crate::error::{Result, SplitterError};
use crate::xml::Element;

/// Rule used to derive the base name of each output file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingStrategy {
    /// The running file counter (`1`, `2`, ...).
    #[default]
    Sequential,
    /// Text of the first direct child element with this tag.
    ByChildText(String),
    /// Value of this attribute on the matched element.
    ByAttribute(String),
    /// Value of an attribute on the first direct child with a tag.
    ByChildAttribute(String, String),
}

impl NamingStrategy {
    /// Select a strategy from the two optional naming settings.
    ///
    /// # Errors
    /// Returns `SplitterError::InvalidTagName` if a given name is not a valid XML name.
    ///
    /// # Examples
    /// ```
    /// use xml_splitter::naming::NamingStrategy;
    ///
    /// assert_eq!(NamingStrategy::from_options(None, None).unwrap(), NamingStrategy::Sequential);
    /// assert_eq!(
    ///     NamingStrategy::from_options(Some("id".into()), None).unwrap(),
    ///     NamingStrategy::ByChildText("id".into())
    /// );
    /// ```
    pub fn from_options(child_tag: Option<String>, attribute: Option<String>) -> Result<Self> {
        if let Some(tag) = child_tag.as_deref() {
            validate_name(tag)?;
        }
        if let Some(attr) = attribute.as_deref() {
            validate_name(attr)?;
        }

        Ok(match (child_tag, attribute) {
            (None, None) => Self::Sequential,
            (Some(tag), None) => Self::ByChildText(tag),
            (None, Some(attr)) => Self::ByAttribute(attr),
            (Some(tag), Some(attr)) => Self::ByChildAttribute(tag, attr),
        })
    }

    fn resolve(&self, element: &Element, number: u64) -> std::result::Result<String, String> {
        match self {
            Self::Sequential => Ok(number.to_string()),
            Self::ByChildText(tag) => element
                .child_named(tag)
                .map(Element::text)
                .ok_or_else(|| format!("<{}> has no child <{tag}>", element.name())),
            Self::ByAttribute(attr) => element
                .attribute(attr)
                .map(str::to_string)
                .ok_or_else(|| format!("<{}> has no attribute '{attr}'", element.name())),
            Self::ByChildAttribute(tag, attr) => {
                let child = element
                    .child_named(tag)
                    .ok_or_else(|| format!("<{}> has no child <{tag}>", element.name()))?;
                child
                    .attribute(attr)
                    .map(str::to_string)
                    .ok_or_else(|| format!("child <{tag}> has no attribute '{attr}'"))
            }
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential numbering"),
            Self::ByChildText(tag) => write!(f, "text of child <{tag}>"),
            Self::ByAttribute(attr) => write!(f, "attribute '{attr}'"),
            Self::ByChildAttribute(tag, attr) => write!(f, "attribute '{attr}' of child <{tag}>"),
        }
    }
}

/// Counts processed matches, starting at [`FIRST_FILE_NUMBER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCounter {
    next: u64,
}

impl FileCounter {
    /// Create a counter at the first file number.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: FIRST_FILE_NUMBER,
        }
    }

    /// Number the next match will use.
    pub fn current(&self) -> u64 {
        self.next
    }

    fn advance(&mut self) {
        self.next += 1;
    }
}

impl Default for FileCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the base name (without extension) for an extracted element.
///
/// The counter advances exactly once per call, whichever strategy is active
/// and whether or not a name could be derived. Names are used verbatim;
/// characters that are unsafe in file names are not replaced, and an empty
/// child text or attribute value gives an empty name.
///
/// # Errors
/// Returns `SplitterError::NameResolution` when the child or attribute the
/// strategy needs is missing.
///
/// # Examples
/// ```
/// use xml_splitter::naming::{resolve_name, FileCounter, NamingStrategy};
/// use xml_splitter::xml::Element;
///
/// let item = Element::new("item").with_attribute("code", "A-7");
/// let mut counter = FileCounter::new();
///
/// assert_eq!(resolve_name(&item, &NamingStrategy::Sequential, &mut counter).unwrap(), "1");
/// let by_code = NamingStrategy::ByAttribute("code".into());
/// assert_eq!(resolve_name(&item, &by_code, &mut counter).unwrap(), "A-7");
/// assert_eq!(counter.current(), 3);
/// ```
pub fn resolve_name(
    element: &Element,
    strategy: &NamingStrategy,
    counter: &mut FileCounter,
) -> Result<String> {
    let number = counter.current();
    let resolved = strategy.resolve(element, number);
    counter.advance();

    resolved.map_err(|reason| SplitterError::NameResolution {
        strategy: strategy.to_string(),
        reason,
        match_index: number,
    })
}
