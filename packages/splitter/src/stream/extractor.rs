//! Materializing a matched element into an owned tree.

use std::io::BufRead;

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use super::{MatchedStart, SourceStream};
use crate::error::{Result, SplitterError};
use crate::xml::{Element, Node};

enum Step {
    Open(Element),
    Child(Node),
    Close,
    Eof,
    Skip,
}

/// Read the subtree of a matched element into an [`Element`].
///
/// Consumes events up to and including the matching end tag, so the stream
/// continues right after the subtree. Cost and memory are proportional to the
/// subtree only. Processing instructions and doctype declarations inside the
/// subtree are dropped.
///
/// Names and text are decoded from the document encoding. Namespace
/// declarations inherited from ancestors of the match are copied onto the
/// returned root.
///
/// # Errors
/// Returns `SplitterError::MalformedInput` for syntax or encoding errors and
/// `SplitterError::UnexpectedEof` if the document ends inside the subtree.
pub fn extract<R: BufRead>(stream: &mut SourceStream<R>, matched: MatchedStart) -> Result<Element> {
    let decoder = stream.decoder();
    let mut current =
        element_from_start(&matched.start, decoder).map_err(|e| stream.malformed(e))?;
    current.inherit_namespaces(matched.namespaces());
    if matched.is_empty() {
        return Ok(current);
    }

    let mut parents: Vec<Element> = Vec::new();
    loop {
        let step = match stream.advance()? {
            Event::Start(start) => element_from_start(&start, decoder).map(Step::Open),
            Event::Empty(start) => {
                element_from_start(&start, decoder).map(|e| Step::Child(Node::Element(e)))
            }
            Event::End(_) => Ok(Step::Close),
            Event::Text(text) => text
                .unescape()
                .map(|t| Step::Child(Node::Text(t.into_owned()))),
            Event::CData(data) => decode(decoder, &data).map(|t| Step::Child(Node::CData(t))),
            Event::Comment(comment) => {
                decode(decoder, &comment).map(|t| Step::Child(Node::Comment(t)))
            }
            Event::Eof => Ok(Step::Eof),
            _ => Ok(Step::Skip),
        };

        match step.map_err(|e| stream.malformed(e))? {
            Step::Open(element) => {
                parents.push(current);
                current = element;
            }
            Step::Child(node) => current.push(node),
            Step::Close => match parents.pop() {
                Some(mut parent) => {
                    parent.push(Node::Element(current));
                    current = parent;
                }
                None => return Ok(current),
            },
            Step::Eof => {
                return Err(SplitterError::UnexpectedEof {
                    tag: String::from_utf8_lossy(matched.start.name().as_ref()).into_owned(),
                    position: matched.position(),
                });
            }
            Step::Skip => {}
        }
    }
}

fn element_from_start(
    start: &BytesStart<'_>,
    decoder: Decoder,
) -> std::result::Result<Element, quick_xml::Error> {
    let mut element = Element::new(decode(decoder, start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let name = decode(decoder, attribute.key.as_ref())?;
        let value = attribute.decode_and_unescape_value(decoder)?.into_owned();
        element.set_attribute(name, value);
    }
    Ok(element)
}

fn decode(decoder: Decoder, bytes: &[u8]) -> std::result::Result<String, quick_xml::Error> {
    Ok(decoder.decode(bytes)?.into_owned())
}
