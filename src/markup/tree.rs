//! Materialized element trees returned by [`Reader::parse_subtree`].
//!
//! [`Reader::parse_subtree`]: super::Reader::parse_subtree

/// A node in a materialized subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, references already decoded.
    Text(String),
    Comment(String),
}

/// An element with its attributes and content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Lower-cased tag name
    pub name: String,
    /// Attributes in document order, names lower-cased
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Element {
            name: name.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        attr(&self.attributes, name)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        has_class(&self.attributes, class)
    }

    /// Direct element children.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First element (this one included) matching `pred`, depth-first.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.elements().find_map(|child| child.find(pred))
    }

    /// All elements (this one included) in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}

fn collect<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(element);
    for child in element.elements() {
        collect(child, out);
    }
}

pub(crate) fn attr<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

pub(crate) fn has_class(attributes: &[(String, String)], class: &str) -> bool {
    attr(attributes, "class")
        .map(|value| value.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}
