use serde::Deserialize;

/// Options for writing GPX XML.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    /// String repeated once per nesting level (default: a tab)
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Line terminator after every tag (default: CRLF)
    #[serde(default)]
    pub line_ending: LineEnding,

    /// Which tag names to emit for comment, source and fix (default: GPX 1.1)
    #[serde(default)]
    pub tag_names: TagNames,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            line_ending: LineEnding::default(),
            tag_names: TagNames::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }
}

/// Tag naming for the waypoint children whose legacy output diverged from
/// the GPX 1.1 schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagNames {
    /// `<cmt>`, `<src>` and `<fix>` as the schema defines them.
    #[default]
    Gpx11,
    /// Byte-compatible with older writers: no `<cmt>`, and both the source
    /// text and the fix value written as `<source>`.
    Legacy,
}

/// Options for GeoJSON conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Include elevation as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Include the timestamp in properties (default: true)
    #[serde(default = "default_true")]
    pub include_time: bool,

    /// Include metadata (name, desc, dilution, etc.) in properties (default: true)
    #[serde(default = "default_true")]
    pub include_metadata: bool,

    /// Include links in properties (default: true)
    #[serde(default = "default_true")]
    pub include_links: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_elevation: true,
            include_time: true,
            include_metadata: true,
            include_links: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_indent() -> String {
    "\t".to_string()
}
