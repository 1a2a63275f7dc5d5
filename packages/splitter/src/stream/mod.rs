//! Forward-only access to the source document.
//!
//! [`SourceStream`] wraps a pull-based `quick_xml` reader. [`TagLocator`]
//! moves it to the next start of the target element and [`extract`]
//! materializes that element into an [`Element`](crate::xml::Element).
//! Only one event is buffered at a time.
//!
//! The stream also remembers the namespace declarations of every open
//! element, so an extracted match can be given the declarations it inherits
//! from its ancestors.

mod extractor;
mod locator;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, SplitterError};
use crate::xml::{declare_namespace, is_namespace_declaration};

pub use extractor::extract;
pub use locator::{Located, MatchedStart, TagLocator};

/// Forward-only cursor over an XML document.
pub struct SourceStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// `xmlns` declarations of each open element, outermost first.
    scopes: Vec<Vec<(String, String)>>,
}

impl SourceStream<BufReader<File>> {
    /// Open a document on disk.
    ///
    /// # Errors
    /// Returns `SplitterError::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> SourceStream<R> {
    /// Wrap any buffered reader.
    pub fn from_reader(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        let config = reader.config_mut();
        config.expand_empty_elements = false;
        config.trim_text(false);
        config.check_end_names = true;

        Self {
            reader,
            buf: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Byte offset of the next unread token.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    /// Decoder for the document encoding.
    ///
    /// Starts as UTF-8 and follows the `encoding` of the XML declaration once
    /// it has been read.
    pub(crate) fn decoder(&self) -> Decoder {
        self.reader.decoder()
    }

    /// Namespace declarations in scope at the current position.
    ///
    /// The innermost declaration wins for each prefix. Right after a
    /// non-empty start tag this includes that element's own declarations.
    pub fn namespaces_in_scope(&self) -> Vec<(String, String)> {
        let mut in_scope = Vec::new();
        for (name, uri) in self.scopes.iter().flatten() {
            declare_namespace(&mut in_scope, name, uri);
        }
        in_scope
    }

    /// Advance to the next token.
    ///
    /// The returned event borrows the stream's buffer and is invalidated by
    /// the next call. At the end of the document `Event::Eof` is returned,
    /// repeatedly if called again.
    ///
    /// # Errors
    /// Returns `SplitterError::MalformedInput` when the reader reports a
    /// syntax error.
    pub fn advance(&mut self) -> Result<Event<'_>> {
        self.buf.clear();
        let event = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => event,
            Err(source) => {
                return Err(SplitterError::MalformedInput {
                    position: self.reader.buffer_position(),
                    source,
                })
            }
        };

        match &event {
            Event::Start(start) => {
                match namespace_declarations(start, self.reader.decoder()) {
                    Ok(declarations) => self.scopes.push(declarations),
                    Err(source) => {
                        return Err(SplitterError::MalformedInput {
                            position: self.reader.buffer_position(),
                            source,
                        })
                    }
                }
            }
            Event::End(_) => {
                self.scopes.pop();
            }
            _ => {}
        }

        Ok(event)
    }

    pub(crate) fn malformed(&self, source: quick_xml::Error) -> SplitterError {
        SplitterError::MalformedInput {
            position: self.position(),
            source,
        }
    }
}

fn namespace_declarations(
    start: &BytesStart<'_>,
    decoder: Decoder,
) -> std::result::Result<Vec<(String, String)>, quick_xml::Error> {
    let mut declarations = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let name = decoder.decode(attribute.key.as_ref())?;
        if is_namespace_declaration(&name) {
            let uri = attribute.decode_and_unescape_value(decoder)?;
            declarations.push((name.into_owned(), uri.into_owned()));
        }
    }
    Ok(declarations)
}
