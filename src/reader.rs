use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::decoder::decode;
use crate::error::GpxWaypointError;
use crate::extensions::{ExtensionElement, Extensions};
use crate::link::Link;
use crate::waypoint::Waypoint;

type Result<T> = std::result::Result<T, GpxWaypointError>;

/// Raw text of one `<wpt>` element, keyed by attribute or child tag name,
/// before any type coercion.
#[derive(Debug, Default)]
pub struct RawWaypoint {
    pub fields: HashMap<String, String>,
    pub links: Vec<Link>,
    pub extensions: Option<Extensions>,
}

impl RawWaypoint {
    /// Decode the fields and attach links and extensions.
    pub fn into_waypoint(self) -> Waypoint {
        let mut wpt = decode(&self.fields);
        wpt.add_links(self.links);
        wpt.extensions = self.extensions;
        wpt
    }
}

/// Parse a GPX document into decoded waypoints.
pub fn parse_waypoints(xml: &str) -> Result<Vec<Waypoint>> {
    Ok(read_waypoints(xml)?
        .into_iter()
        .map(RawWaypoint::into_waypoint)
        .collect())
}

/// Collect the raw contents of every top-level `<wpt>` in a GPX document.
/// Route and track points are skipped.
pub fn read_waypoints(xml: &str) -> Result<Vec<RawWaypoint>> {
    let mut reader = Reader::from_str(xml);
    let mut waypoints = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"wpt" => waypoints.push(read_point(&e, &mut reader)?),
                b"rte" | b"trk" | b"metadata" | b"extensions" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"wpt" {
                    let mut raw = RawWaypoint::default();
                    collect_attributes(&e, &mut raw.fields)?;
                    waypoints.push(raw);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxWaypointError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(waypoints)
}

/// Copy the attributes of a start tag into `fields`, unescaped.
fn collect_attributes(e: &BytesStart<'_>, fields: &mut HashMap<String, String>) -> Result<()> {
    for (key, value) in attributes(e, true)? {
        fields.insert(key, value);
    }
    Ok(())
}

/// Attribute pairs of a start tag. With `local` set, namespace prefixes are
/// dropped from the keys.
fn attributes(e: &BytesStart<'_>, local: bool) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result?;
        let key = if local {
            String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned()
        } else {
            String::from_utf8_lossy(attr.key.as_ref()).into_owned()
        };
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map(|v| v.into_owned()).unwrap_or_else(|_| raw.to_string());
        pairs.push((key, value));
    }
    Ok(pairs)
}

/// Read a `<wpt>` element and its children.
/// Called after receiving Event::Start for the element.
fn read_point<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<RawWaypoint> {
    let mut raw = RawWaypoint::default();
    collect_attributes(start, &mut raw.fields)?;

    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"link" => raw.links.push(read_link(&e, reader)?),
                b"extensions" => raw.extensions = Some(read_extensions(&e, reader)?),
                name => {
                    let key = String::from_utf8_lossy(name).into_owned();
                    let text = read_text_owned(reader, &e)?;
                    trace!(%key, "read waypoint field");
                    raw.fields.insert(key, text);
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"link" => raw.links.push(Link::new(href(&e)?)),
                b"extensions" => {}
                name => {
                    let key = String::from_utf8_lossy(name).into_owned();
                    trace!(%key, "read empty waypoint field");
                    raw.fields.insert(key, String::new());
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxWaypointError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(raw)
}

fn href(e: &BytesStart<'_>) -> Result<String> {
    Ok(attributes(e, true)?
        .into_iter()
        .find(|(k, _)| k == "href")
        .map(|(_, v)| v)
        .unwrap_or_default())
}

/// Read a `<link>` element.
fn read_link<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Link> {
    let mut link = Link::new(href(start)?);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"text" => link.text = Some(read_text_owned(reader, &e)?),
                b"type" => link.mime_type = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"link" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxWaypointError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(link)
}

/// Read an `<extensions>` element into an opaque tree.
fn read_extensions<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Extensions> {
    let element = read_extension_element(start, reader)?;
    Ok(Extensions {
        children: element.children,
    })
}

fn read_extension_element<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<ExtensionElement> {
    let mut element = ExtensionElement::new(String::from_utf8_lossy(start.name().as_ref()));
    element.attributes = attributes(start, false)?;

    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => element.children.push(read_extension_element(&e, reader)?),
            Ok(Event::Empty(e)) => {
                let mut child = ExtensionElement::new(String::from_utf8_lossy(e.name().as_ref()));
                child.attributes = attributes(&e, false)?;
                element.children.push(child);
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Ok(event) => append_text(&event, &mut text),
            Err(e) => return Err(GpxWaypointError::XmlParse(e)),
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        element.text = Some(text.to_string());
    }
    Ok(element)
}

/// Read text content of an element as an owned, trimmed String.
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Ok(event) => append_text(&event, &mut text),
            Err(e) => return Err(GpxWaypointError::XmlParse(e)),
        }
    }

    Ok(text.trim().to_string())
}

/// Append character data carried by `event`: regular text, CDATA sections,
/// and entity references (Event::GeneralRef). Other events are ignored.
fn append_text(event: &Event<'_>, text: &mut String) {
    match event {
        Event::Text(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
        Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
        Event::GeneralRef(e) => {
            if let Ok(Some(ch)) = e.resolve_char_ref() {
                text.push(ch);
                return;
            }
            let name: &[u8] = e;
            match name {
                b"amp" => text.push('&'),
                b"lt" => text.push('<'),
                b"gt" => text.push('>'),
                b"quot" => text.push('"'),
                b"apos" => text.push('\''),
                other => trace!(entity = %String::from_utf8_lossy(other), "skipping unknown entity"),
            }
        }
        _ => {}
    }
}
