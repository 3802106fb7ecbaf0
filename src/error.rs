use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum GpxWaypointError {
    XmlParse(quick_xml::Error),
    MalformedTimestamp {
        value: String,
    },
    InvalidOptions(String),
}

impl std::fmt::Display for GpxWaypointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::MalformedTimestamp { value } => {
                write!(f, "Malformed timestamp '{value}', expected YYYY-MM-DDThh:mm:ssZ")
            }
            Self::InvalidOptions(msg) => write!(f, "Invalid options: {msg}"),
        }
    }
}

impl std::error::Error for GpxWaypointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for GpxWaypointError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for GpxWaypointError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(e.into())
    }
}

impl From<GpxWaypointError> for JsValue {
    fn from(e: GpxWaypointError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
