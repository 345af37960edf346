use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// A generic XML tree node.
///
/// Tags keep the qualified name exactly as written in the document
/// (`edit-config`, `nc:edit-config`). Namespace declarations are ordinary
/// attributes (`xmlns`, `xmlns:nc`); resolution against them is left to
/// callers that care, such as the envelope codec.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    /// Element tag name, including any prefix.
    pub tag: String,
    /// XML attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements.
    pub children: Vec<XmlNode>,
    /// Optional text content.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new XML node with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Set an attribute, returning the node for chained construction.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append a child element, returning the node for chained construction.
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text content, returning the node for chained construction.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        match self.tag.split_once(':') {
            Some((_, local)) => local,
            None => &self.tag,
        }
    }

    /// Namespace prefix of the tag, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.tag.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Walk a nested child path and return terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        if path.is_empty() {
            return self.text.as_deref();
        }

        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        current.text.as_deref()
    }
}

impl Display for XmlNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return write!(f, "/>");
        }

        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", text)?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::XmlNode;

    #[test]
    fn builders_chain_attributes_children_and_text() {
        let node = XmlNode::new("rpc")
            .with_attribute("message-id", "101")
            .with_child(XmlNode::new("default-operation").with_text("merge"));

        assert_eq!(node.attributes.get("message-id"), Some(&"101".to_string()));
        assert_eq!(node.get_text(&["default-operation"]), Some("merge"));
    }

    #[test]
    fn local_name_and_prefix_split_qualified_tags() {
        let plain = XmlNode::new("edit-config");
        let prefixed = XmlNode::new("nc:edit-config");

        assert_eq!(plain.local_name(), "edit-config");
        assert_eq!(plain.prefix(), None);
        assert_eq!(prefixed.local_name(), "edit-config");
        assert_eq!(prefixed.prefix(), Some("nc"));
    }

    #[test]
    fn get_text_walks_nested_path() {
        let mut root = XmlNode::new("rpc");
        let mut target = XmlNode::new("target");
        let mut running = XmlNode::new("running");
        running.text = Some("value".to_string());
        target.children.push(running);
        root.children.push(target);

        assert_eq!(root.get_text(&["target", "running"]), Some("value"));
    }

    #[test]
    fn display_renders_compact_form() {
        let node = XmlNode::new("target").with_child(XmlNode::new("running"));
        assert_eq!(node.to_string(), "<target><running/></target>");
    }
}
