use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::decoder;
use crate::encoder;
use crate::extensions::Extensions;
use crate::link::Link;

/// Process-unique key identifying a waypoint. Links refer back to their
/// owner through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointId(u64);

impl WaypointId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single GPX waypoint (`<wpt>`). Every field is optional; absence means
/// "unknown", never zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    #[serde(skip)]
    id: WaypointId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub magnetic_variation: Option<f64>,
    pub geoid_height: Option<f64>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    links: Vec<Link>,
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub waypoint_type: Option<String>,
    pub fix: Option<i64>,
    pub satellites: Option<i64>,
    pub horizontal_dilution: Option<f64>,
    pub vertical_dilution: Option<f64>,
    pub position_dilution: Option<f64>,
    pub age_of_dgps_data: Option<f64>,
    pub dgps_id: Option<i64>,
    pub extensions: Option<Extensions>,
}

impl Waypoint {
    /// Empty waypoint stamped with the current time.
    pub fn new() -> Self {
        Self {
            time: Some(Utc::now()),
            ..Self::blank()
        }
    }

    /// Waypoint at the given position, stamped with the current time.
    pub fn with_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::new()
        }
    }

    /// Build a waypoint from raw GPX attribute/child text keyed by tag name.
    /// `time` stays absent unless the mapping carries one.
    pub fn from_mapping(mapping: &HashMap<String, String>) -> Self {
        decoder::decode(mapping)
    }

    /// Waypoint with every field absent, including `time`.
    pub(crate) fn blank() -> Self {
        Self {
            id: WaypointId::next(),
            latitude: None,
            longitude: None,
            elevation: None,
            time: None,
            magnetic_variation: None,
            geoid_height: None,
            name: None,
            comment: None,
            description: None,
            source: None,
            links: Vec::new(),
            symbol: None,
            waypoint_type: None,
            fix: None,
            satellites: None,
            horizontal_dilution: None,
            vertical_dilution: None,
            position_dilution: None,
            age_of_dgps_data: None,
            dgps_id: None,
            extensions: None,
        }
    }

    pub fn id(&self) -> WaypointId {
        self.id
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Create a link for `href`. The link is not attached until passed to
    /// [`Waypoint::add_link`].
    pub fn new_link(&self, href: impl Into<String>) -> Link {
        Link::new(href)
    }

    /// Attach `link` unless an equal link is already present. Returns whether
    /// the link was added.
    pub fn add_link(&mut self, mut link: Link) -> bool {
        if self.links.contains(&link) {
            trace!(href = %link.href, "skipping duplicate link");
            return false;
        }
        link.set_parent(Some(self.id));
        self.links.push(link);
        true
    }

    pub fn add_links(&mut self, links: impl IntoIterator<Item = Link>) {
        for link in links {
            self.add_link(link);
        }
    }

    /// Detach the first link equal to `link` and hand it back with its
    /// parent cleared.
    pub fn remove_link(&mut self, link: &Link) -> Option<Link> {
        let index = self.links.iter().position(|l| l == link)?;
        let mut removed = self.links.remove(index);
        removed.set_parent(None);
        Some(removed)
    }

    /// Render this waypoint as a standalone `<wpt>` element.
    pub fn to_gpx(&self, indent_level: usize) -> String {
        let mut gpx = String::new();
        encoder::encode(self, &mut gpx, indent_level);
        gpx
    }
}

impl Default for Waypoint {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones get their own key; copied links are re-parented to it.
impl Clone for Waypoint {
    fn clone(&self) -> Self {
        let id = WaypointId::next();
        let links = self
            .links
            .iter()
            .cloned()
            .map(|mut link| {
                link.set_parent(Some(id));
                link
            })
            .collect();

        Self {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            time: self.time,
            magnetic_variation: self.magnetic_variation,
            geoid_height: self.geoid_height,
            name: self.name.clone(),
            comment: self.comment.clone(),
            description: self.description.clone(),
            source: self.source.clone(),
            links,
            symbol: self.symbol.clone(),
            waypoint_type: self.waypoint_type.clone(),
            fix: self.fix,
            satellites: self.satellites,
            horizontal_dilution: self.horizontal_dilution,
            vertical_dilution: self.vertical_dilution,
            position_dilution: self.position_dilution,
            age_of_dgps_data: self.age_of_dgps_data,
            dgps_id: self.dgps_id,
            extensions: self.extensions.clone(),
        }
    }
}

impl From<&HashMap<String, String>> for Waypoint {
    fn from(mapping: &HashMap<String, String>) -> Self {
        decoder::decode(mapping)
    }
}
