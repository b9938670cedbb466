//! XML document tree

use indexmap::IndexMap;

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Element {
    /// Element with no attributes and no content
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Returns the text if the element holds exactly one text node and nothing else
    pub fn sole_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Content::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Iterator over child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// Concatenation of the text nodes directly under this element
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Content::Text(text) => Some(text.as_str()),
                Content::Element(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_text() {
        let mut element = Element::new("a");
        assert_eq!(element.sole_text(), None);

        element.children.push(Content::Text("hi".to_string()));
        assert_eq!(element.sole_text(), Some("hi"));

        element.children.push(Content::Element(Element::new("b")));
        assert_eq!(element.sole_text(), None);
        assert_eq!(element.text(), "hi");
        assert_eq!(element.elements().count(), 1);
    }
}
