use std::io;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::error;

use crate::extensions::{ExtensionElement, Extensions};
use crate::link::Link;
use crate::options::{EncodeOptions, TagNames};
use crate::timestamp::format_timestamp;
use crate::waypoint::Waypoint;

type WriteResult = io::Result<()>;

/// Append `waypoint` as a `<wpt>` element to `gpx` using default options.
pub fn encode(waypoint: &Waypoint, gpx: &mut String, indent_level: usize) {
    encode_with(waypoint, gpx, indent_level, &EncodeOptions::default());
}

/// Append `waypoint` as a `<wpt>` element to `gpx`.
///
/// The open and close tags sit at `indent_level`, children one level deeper.
/// Children are written in GPX schema order and only when present. Nothing
/// already in `gpx` is touched. Non-finite numbers are treated as absent.
pub fn encode_with(waypoint: &Waypoint, gpx: &mut String, indent_level: usize, opts: &EncodeOptions) {
    let mut w = GpxWriter::new(opts);

    match write_waypoint(&mut w, waypoint, indent_level) {
        Ok(()) => gpx.push_str(&String::from_utf8_lossy(&w.into_inner())),
        Err(e) => error!(error = %e, "failed to write waypoint"),
    }
}

fn write_waypoint(w: &mut GpxWriter<'_>, waypoint: &Waypoint, indent_level: usize) -> WriteResult {
    let mut attributes = Vec::new();
    if let Some(lat) = finite(waypoint.latitude) {
        attributes.push(("lat", format_float(lat)));
    }
    if let Some(lon) = finite(waypoint.longitude) {
        attributes.push(("lon", format_float(lon)));
    }
    w.open_tag(indent_level, "wpt", &attributes)?;

    write_children(w, waypoint, indent_level + 1)?;

    w.close_tag(indent_level, "wpt")
}

fn write_children(w: &mut GpxWriter<'_>, wpt: &Waypoint, level: usize) -> WriteResult {
    let legacy = w.opts.tag_names == TagNames::Legacy;

    w.float_property(level, "ele", wpt.elevation)?;
    w.text_property(level, "time", wpt.time.as_ref().map(format_timestamp).as_deref())?;
    w.float_property(level, "magvar", wpt.magnetic_variation)?;
    w.float_property(level, "geoidheight", wpt.geoid_height)?;
    w.text_property(level, "name", wpt.name.as_deref())?;
    if !legacy {
        w.text_property(level, "cmt", wpt.comment.as_deref())?;
    }
    w.text_property(level, "desc", wpt.description.as_deref())?;
    w.text_property(level, if legacy { "source" } else { "src" }, wpt.source.as_deref())?;

    for link in wpt.links() {
        write_link(w, link, level)?;
    }

    w.text_property(level, "sym", wpt.symbol.as_deref())?;
    w.text_property(level, "type", wpt.waypoint_type.as_deref())?;
    w.integer_property(level, if legacy { "source" } else { "fix" }, wpt.fix)?;
    w.integer_property(level, "sat", wpt.satellites)?;
    w.float_property(level, "hdop", wpt.horizontal_dilution)?;
    w.float_property(level, "vdop", wpt.vertical_dilution)?;
    w.float_property(level, "pdop", wpt.position_dilution)?;
    w.float_property(level, "ageofdgpsdata", wpt.age_of_dgps_data)?;
    w.integer_property(level, "dgpsid", wpt.dgps_id)?;

    if let Some(ref extensions) = wpt.extensions {
        write_extensions(w, extensions, level)?;
    }
    Ok(())
}

/// `<link href="…">` with optional `<text>` and `<type>` children.
fn write_link(w: &mut GpxWriter<'_>, link: &Link, level: usize) -> WriteResult {
    w.open_tag(level, "link", &[("href", link.href.clone())])?;
    w.text_property(level + 1, "text", link.text.as_deref())?;
    w.text_property(level + 1, "type", link.mime_type.as_deref())?;
    w.close_tag(level, "link")
}

fn write_extensions(w: &mut GpxWriter<'_>, extensions: &Extensions, level: usize) -> WriteResult {
    w.open_tag(level, "extensions", &[])?;
    for child in &extensions.children {
        write_extension_element(w, child, level + 1)?;
    }
    w.close_tag(level, "extensions")
}

fn write_extension_element(w: &mut GpxWriter<'_>, el: &ExtensionElement, level: usize) -> WriteResult {
    let attributes: Vec<(&str, String)> = el
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();

    if el.children.is_empty() {
        return match el.text.as_deref() {
            Some(text) => w.element(level, &el.name, &attributes, text),
            None => w.empty_tag(level, &el.name, &attributes),
        };
    }

    w.open_tag(level, &el.name, &attributes)?;
    if let Some(ref text) = el.text {
        w.text_line(level + 1, text)?;
    }
    for child in &el.children {
        write_extension_element(w, child, level + 1)?;
    }
    w.close_tag(level, &el.name)
}

/// Six fractional digits, as GPS tooling writes coordinates.
fn format_float(value: f64) -> String {
    format!("{value:.6}")
}

/// NaN and infinities have no GPX decimal form.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Line-oriented XML writer. Indentation and line terminators come from the
/// options and are written around each event.
struct GpxWriter<'a> {
    writer: Writer<Vec<u8>>,
    opts: &'a EncodeOptions,
}

impl<'a> GpxWriter<'a> {
    fn new(opts: &'a EncodeOptions) -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            opts,
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.writer.get_mut().extend_from_slice(self.opts.indent.as_bytes());
        }
    }

    fn end_line(&mut self) {
        self.writer
            .get_mut()
            .extend_from_slice(self.opts.line_ending.as_str().as_bytes());
    }

    fn start<'t>(tag: &'t str, attributes: &[(&str, String)]) -> BytesStart<'t> {
        let mut start = BytesStart::new(tag);
        for (key, value) in attributes {
            start.push_attribute((*key, value.as_str()));
        }
        start
    }

    fn open_tag(&mut self, level: usize, tag: &str, attributes: &[(&str, String)]) -> WriteResult {
        self.indent(level);
        self.writer.write_event(Event::Start(Self::start(tag, attributes)))?;
        self.end_line();
        Ok(())
    }

    fn empty_tag(&mut self, level: usize, tag: &str, attributes: &[(&str, String)]) -> WriteResult {
        self.indent(level);
        self.writer.write_event(Event::Empty(Self::start(tag, attributes)))?;
        self.end_line();
        Ok(())
    }

    fn close_tag(&mut self, level: usize, tag: &str) -> WriteResult {
        self.indent(level);
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        self.end_line();
        Ok(())
    }

    fn text_line(&mut self, level: usize, text: &str) -> WriteResult {
        self.indent(level);
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        self.end_line();
        Ok(())
    }

    fn element(&mut self, level: usize, tag: &str, attributes: &[(&str, String)], text: &str) -> WriteResult {
        self.indent(level);
        let start = Self::start(tag, attributes);
        let end = start.to_end().into_owned();
        self.writer.write_event(Event::Start(start))?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        self.writer.write_event(Event::End(end))?;
        self.end_line();
        Ok(())
    }

    fn text_property(&mut self, level: usize, tag: &str, value: Option<&str>) -> WriteResult {
        match value {
            Some(text) => self.element(level, tag, &[], text),
            None => Ok(()),
        }
    }

    fn float_property(&mut self, level: usize, tag: &str, value: Option<f64>) -> WriteResult {
        match finite(value) {
            Some(v) => self.element(level, tag, &[], &format_float(v)),
            None => Ok(()),
        }
    }

    fn integer_property(&mut self, level: usize, tag: &str, value: Option<i64>) -> WriteResult {
        match value {
            Some(v) => self.element(level, tag, &[], &v.to_string()),
            None => Ok(()),
        }
    }
}
