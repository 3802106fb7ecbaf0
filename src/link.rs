use serde::Serialize;

use crate::waypoint::WaypointId;

/// A GPX `<link>` element pointing at an external resource.
///
/// Equality compares `href`, `text` and `type`; the owning waypoint is not
/// part of a link's value.
#[derive(Debug, Serialize)]
pub struct Link {
    pub href: String,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    #[serde(skip)]
    parent: Option<WaypointId>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: None,
            mime_type: None,
            parent: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Key of the waypoint currently holding this link.
    pub fn parent(&self) -> Option<WaypointId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WaypointId>) {
        self.parent = parent;
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.href == other.href && self.text == other.text && self.mime_type == other.mime_type
    }
}

impl Eq for Link {}

/// A copy is detached: it belongs to no waypoint until added to one.
impl Clone for Link {
    fn clone(&self) -> Self {
        Self {
            href: self.href.clone(),
            text: self.text.clone(),
            mime_type: self.mime_type.clone(),
            parent: None,
        }
    }
}
