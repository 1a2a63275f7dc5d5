//! XML serialization of extracted elements.

use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{Element, Node};

impl Element {
    /// Serialize as a standalone UTF-8 document.
    ///
    /// Output is an XML declaration, a newline, the element and a trailing
    /// newline. Elements without children are written as `<tag/>`.
    ///
    /// # Examples
    /// ```
    /// use xml_splitter::xml::Element;
    ///
    /// let item = Element::new("item")
    ///     .with_attribute("code", "A&B")
    ///     .with_child(Element::new("id").with_text("1"))
    ///     .with_child(Element::new("empty"));
    ///
    /// let xml = String::from_utf8(item.to_document().unwrap()).unwrap();
    /// assert_eq!(
    ///     xml,
    ///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<item code=\"A&amp;B\"><id>1</id><empty/></item>\n"
    /// );
    /// ```
    pub fn to_document(&self) -> std::io::Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.get_mut().write_all(b"\n")?;
        write_element(&mut writer, self)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(writer.into_inner())
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name());
    for (name, value) in element.attributes() {
        start.push_attribute((name, value));
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        match child {
            Node::Element(nested) => write_element(writer, nested)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
            Node::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))
}
