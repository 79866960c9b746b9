//! Element handles over a `roxmltree` document

use std::fmt;

use roxmltree::{Document, Node, NodeId, ParsingOptions};

pub type XmlError = roxmltree::Error;

/// Stable identifier of an element inside one [`XmlDocument`]
pub type ElementId = NodeId;

/// Parsed XML document borrowing its source text
pub struct XmlDocument<'input> {
    doc: Document<'input>,
}

impl<'input> XmlDocument<'input> {
    /// Parse a document from a string
    pub fn parse(text: &'input str) -> Result<Self, XmlError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Document::parse_with_options(text, options).map(|doc| Self { doc })
    }

    fn tree(&self) -> &Document<'_> {
        &self.doc
    }

    /// The document element
    pub fn root(&self) -> Element<'_> {
        Element(self.tree().root_element())
    }

    /// Handle for a known element id
    pub fn element(&self, id: ElementId) -> Option<Element<'_>> {
        self.tree()
            .get_node(id)
            .filter(|node| node.is_element())
            .map(Element)
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        self.tree()
            .descendants()
            .filter(|node| node.is_element())
            .map(Element)
    }

    /// All elements with the given local name, in document order
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements().filter(move |e| e.name() == name)
    }

    pub fn len(&self) -> usize {
        self.elements().count()
    }
}

impl fmt::Debug for XmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.root())
            .finish()
    }
}

/// Borrowed handle to one element of an [`XmlDocument`]
///
/// Handles compare by identity: two handles are equal only if they point at
/// the same element of the same document.
#[derive(Clone, Copy, PartialEq)]
pub struct Element<'d>(Node<'d, 'd>);

impl Eq for Element<'_> {}

impl<'d> Element<'d> {
    pub fn id(&self) -> ElementId {
        self.0.id()
    }

    /// Local name, without namespace prefix
    pub fn name(&self) -> &'d str {
        self.0.tag_name().name()
    }

    /// Attribute value by local name, in any namespace
    pub fn attr(&self, name: &str) -> Option<&'d str> {
        self.0
            .attributes()
            .find(|a| a.name() == name)
            .map(|a| a.value())
    }

    /// Attribute value, treating empty or whitespace-only values as absent
    pub fn non_empty_attr(&self, name: &str) -> Option<&'d str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Trimmed leading text content
    pub fn text(&self) -> &'d str {
        self.0.text().map(str::trim).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.0.parent_element().map(Element)
    }

    pub fn children(&self) -> impl Iterator<Item = Element<'d>> + 'd {
        self.0.children().filter(|c| c.is_element()).map(Element)
    }

    pub fn children_named<'n>(&self, name: &'n str) -> impl Iterator<Item = Element<'d>> + 'n
    where
        'd: 'n,
    {
        self.children().filter(move |c| c.name() == name)
    }

    pub fn child(&self, name: &str) -> Option<Element<'d>> {
        self.children().find(|c| c.name() == name)
    }

    /// Descendants in document order, excluding `self`
    pub fn descendants(&self) -> impl Iterator<Item = Element<'d>> + 'd {
        self.0
            .descendants()
            .skip(1)
            .filter(|d| d.is_element())
            .map(Element)
    }

    pub fn descendants_named<'n>(&self, name: &'n str) -> impl Iterator<Item = Element<'d>> + 'n
    where
        'd: 'n,
    {
        self.descendants().filter(move |d| d.name() == name)
    }

    /// Ancestors from the parent up to the document element
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'d>> + 'd {
        self.0
            .ancestors()
            .skip(1)
            .filter(|a| a.is_element())
            .map(Element)
    }

    /// Select elements along a relative child path such as
    /// `originInfo/place/placeTerm[@type='text']`
    pub fn select(&self, path: &str) -> Vec<Element<'d>> {
        let mut current = vec![*self];
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let step = Step::parse(raw);
            current = current
                .iter()
                .flat_map(|e| e.children())
                .filter(|c| step.matches(c))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn select_first(&self, path: &str) -> Option<Element<'d>> {
        self.select(path).into_iter().next()
    }

    /// Text of the first element on `path` that carries non-empty text
    pub fn select_text(&self, path: &str) -> Option<&'d str> {
        self.select(path)
            .into_iter()
            .map(|e| e.text())
            .find(|t| !t.is_empty())
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("name", &self.name());
        if let Some(id) = self.attr("ID") {
            s.field("ID", &id);
        }
        s.finish()
    }
}

/// One step of a `select` path: a local name plus an optional
/// `[@attr='value']` predicate
struct Step<'p> {
    name: &'p str,
    predicate: Option<(&'p str, &'p str)>,
}

impl<'p> Step<'p> {
    fn parse(raw: &'p str) -> Self {
        let Some((name, rest)) = raw.split_once('[') else {
            return Self {
                name: raw,
                predicate: None,
            };
        };
        let predicate = rest
            .strip_suffix(']')
            .and_then(|p| p.strip_prefix('@'))
            .and_then(|p| p.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim().trim_matches(|c| c == '\'' || c == '"')));
        Self { name, predicate }
    }

    fn matches(&self, element: &Element<'_>) -> bool {
        if self.name != "*" && element.name() != self.name {
            return false;
        }
        match self.predicate {
            Some((key, value)) => element.attr(key) == Some(value),
            None => true,
        }
    }
}
