//! Locating the next start of a target element.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use super::SourceStream;
use crate::error::Result;

/// Outcome of [`TagLocator::locate_next`].
#[derive(Debug)]
pub enum Located {
    /// The stream is positioned just past a matching start tag.
    Found(MatchedStart),
    /// The document ended without another match.
    EndOfStream,
}

/// A matched start tag, detached from the stream buffer.
#[derive(Debug)]
pub struct MatchedStart {
    pub(crate) start: BytesStart<'static>,
    empty: bool,
    position: u64,
    namespaces: Vec<(String, String)>,
}

impl MatchedStart {
    /// Byte offset of the `<` opening the matched tag.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether the match was a self-closing tag (`<item/>`).
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Namespace declarations in scope at the matched tag, its own included.
    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }
}

/// Finds successive start tags with a given name.
///
/// Names are compared byte for byte, prefix included, without namespace
/// resolution. Normal and self-closing tags match alike.
#[derive(Debug, Clone)]
pub struct TagLocator {
    tag: Option<String>,
}

impl TagLocator {
    /// Locator for elements named `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
        }
    }

    /// Locator matching any element.
    #[must_use]
    pub fn any_element() -> Self {
        Self { tag: None }
    }

    fn matches(&self, start: &BytesStart<'_>) -> bool {
        match &self.tag {
            Some(tag) => start.name().as_ref() == tag.as_bytes(),
            None => true,
        }
    }

    /// Advance `stream` to the next matching start tag.
    ///
    /// Each call resumes where the stream currently is, so a full run is one
    /// linear pass no matter how many matches there are.
    ///
    /// # Errors
    /// Returns `SplitterError::MalformedInput` if the document is not
    /// well-formed before the next match.
    pub fn locate_next<R: BufRead>(&self, stream: &mut SourceStream<R>) -> Result<Located> {
        loop {
            let position = stream.position();
            let (start, empty) = match stream.advance()? {
                Event::Start(start) if self.matches(&start) => (start.into_owned(), false),
                Event::Empty(start) if self.matches(&start) => (start.into_owned(), true),
                Event::Eof => return Ok(Located::EndOfStream),
                _ => continue,
            };

            tracing::trace!(position, empty, "matched start tag");
            return Ok(Located::Found(MatchedStart {
                start,
                empty,
                position,
                namespaces: stream.namespaces_in_scope(),
            }));
        }
    }
}
