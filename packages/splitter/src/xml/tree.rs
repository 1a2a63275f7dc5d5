//! Stream-independent element tree produced for each match.

use crate::error::{Result, SplitterError};
use crate::stream::{extract, Located, SourceStream, TagLocator};

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
    /// Content of a `<![CDATA[...]]>` section.
    CData(String),
    /// Content of a `<!-- ... -->` comment.
    Comment(String),
}

/// A fully materialized element with its attributes and children.
///
/// Attribute names are unique and keep their document order. Children keep
/// document order as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value for the same name.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name.into(), value.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(Node::Element(child));
        self
    }

    /// Append a text node.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push(Node::Text(text.into()));
        self
    }

    pub(crate) fn set_attribute(&mut self, name: String, value: String) {
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Add namespace declarations inherited from outside this element.
    ///
    /// Prefixes the element declares itself are left alone. Inherited
    /// declarations go before the element's own attributes.
    pub(crate) fn inherit_namespaces(&mut self, in_scope: &[(String, String)]) {
        let inherited: Vec<(String, String)> = in_scope
            .iter()
            .filter(|(name, _)| self.attribute(name).is_none())
            .cloned()
            .collect();
        if !inherited.is_empty() {
            self.attributes.splice(0..0, inherited);
        }
    }

    /// Tag name, including any namespace prefix as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Value of the attribute `name`, or `None` if absent.
    ///
    /// # Examples
    /// ```
    /// use xml_splitter::xml::Element;
    ///
    /// let item = Element::new("item").with_attribute("code", "A-1");
    /// assert_eq!(item.attribute("code"), Some("A-1"));
    /// assert_eq!(item.attribute("missing"), None);
    /// ```
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First direct child element named `tag`.
    ///
    /// Only direct children are considered; deeper descendants with the same
    /// name are ignored.
    pub fn child_named(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == tag)
    }

    /// Concatenated text and CDATA content of the direct children.
    ///
    /// Text inside nested elements is not included. Whitespace is kept as is.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All descendants named `tag`, in document order, excluding `self`.
    pub fn descendants_named<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(self, tag, &mut found);
        found
    }

    /// Detached copies of all descendants named `tag`, in document order.
    ///
    /// Each copy carries the namespace declarations in scope at its position,
    /// so it can be serialized as a document of its own.
    pub fn detached_descendants_named(&self, tag: &str) -> Vec<Element> {
        let in_scope: Vec<(String, String)> = self
            .namespace_declarations()
            .map(|(name, uri)| (name.to_string(), uri.to_string()))
            .collect();
        let mut found = Vec::new();
        detach_named(self, tag, &in_scope, &mut found);
        found
    }

    /// `xmlns` and `xmlns:*` attributes of this element.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes().filter(|(name, _)| is_namespace_declaration(name))
    }

    /// Parse the first element of an XML string into a tree.
    ///
    /// # Errors
    /// Returns `SplitterError::MalformedInput` or `SplitterError::UnexpectedEof`
    /// if the string is not well-formed, and `SplitterError::EmptyDocument`
    /// if it contains no element at all.
    ///
    /// # Examples
    /// ```
    /// use xml_splitter::xml::Element;
    ///
    /// let item = Element::parse_str(r#"<item code="7"><id>a</id></item>"#).unwrap();
    /// assert_eq!(item.attribute("code"), Some("7"));
    /// assert_eq!(item.child_named("id").map(|id| id.text()), Some("a".to_string()));
    /// ```
    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut stream = SourceStream::from_reader(xml.as_bytes());
        match TagLocator::any_element().locate_next(&mut stream)? {
            Located::Found(matched) => extract(&mut stream, matched),
            Located::EndOfStream => Err(SplitterError::EmptyDocument),
        }
    }
}

fn collect_named<'a>(element: &'a Element, tag: &str, found: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        if child.name == tag {
            found.push(child);
        }
        collect_named(child, tag, found);
    }
}

fn detach_named(
    element: &Element,
    tag: &str,
    in_scope: &[(String, String)],
    found: &mut Vec<Element>,
) {
    for child in element.child_elements() {
        let mut scope = in_scope.to_vec();
        for (name, uri) in child.namespace_declarations() {
            declare_namespace(&mut scope, name, uri);
        }

        if child.name == tag {
            let mut detached = child.clone();
            detached.inherit_namespaces(&scope);
            found.push(detached);
        }
        detach_named(child, tag, &scope, found);
    }
}

/// Whether an attribute name declares a namespace.
pub(crate) fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// Bind `name` to `uri` in `scope`, replacing an outer binding of the same prefix.
pub(crate) fn declare_namespace(scope: &mut Vec<(String, String)>, name: &str, uri: &str) {
    match scope.iter_mut().find(|(existing, _)| existing == name) {
        Some((_, bound)) => *bound = uri.to_string(),
        None => scope.push((name.to_string(), uri.to_string())),
    }
}
