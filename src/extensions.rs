use serde::Serialize;

/// Contents of a GPX `<extensions>` element, kept as an opaque element tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extensions {
    pub children: Vec<ExtensionElement>,
}

/// One element inside `<extensions>`, with its qualified name
/// (e.g. `gpxtpx:hr`) and attributes in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<ExtensionElement>,
}

impl ExtensionElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: ExtensionElement) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for the first element named `name`.
    pub fn find(&self, name: &str) -> Option<&ExtensionElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ExtensionElement> {
        self.children.iter().find_map(|c| c.find(name))
    }
}
