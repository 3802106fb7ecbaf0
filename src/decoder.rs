use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use crate::timestamp::parse_timestamp;
use crate::waypoint::Waypoint;

/// Build a waypoint from a mapping of GPX tag/attribute names to raw text.
///
/// Values that fail to parse as the field's type, and non-finite decimals,
/// are treated as absent.
/// Fields are read independently of each other.
pub fn decode(mapping: &HashMap<String, String>) -> Waypoint {
    let mut wpt = Waypoint::blank();

    wpt.time = parse_timestamp(mapping.get("time").map(String::as_str));

    wpt.elevation = float(mapping, "ele");
    wpt.latitude = float(mapping, "lat");
    wpt.longitude = float(mapping, "lon");
    wpt.magnetic_variation = float(mapping, "magvar");
    wpt.geoid_height = float(mapping, "geoidheight");
    wpt.name = text(mapping, "name");
    wpt.comment = text(mapping, "cmt");
    wpt.description = text(mapping, "desc");
    wpt.source = text(mapping, "src");
    wpt.symbol = text(mapping, "sym");
    wpt.waypoint_type = text(mapping, "type");
    wpt.fix = parsed(mapping, "fix");
    wpt.satellites = parsed(mapping, "sat");
    wpt.horizontal_dilution = float(mapping, "hdop");
    wpt.vertical_dilution = float(mapping, "vdop");
    wpt.position_dilution = float(mapping, "pdop");
    wpt.age_of_dgps_data = float(mapping, "ageofdgpsdata");
    wpt.dgps_id = parsed(mapping, "dgpsid");

    wpt
}

fn parsed<T>(mapping: &HashMap<String, String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = mapping.get(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(key, value = %raw, error = %e, "ignoring unparsable waypoint field");
            None
        }
    }
}

/// `f64::from_str` accepts `NaN` and `inf`; GPX decimals cannot carry them.
fn float(mapping: &HashMap<String, String>, key: &str) -> Option<f64> {
    let value: f64 = parsed(mapping, key)?;
    if value.is_finite() {
        Some(value)
    } else {
        debug!(key, value, "ignoring non-finite waypoint field");
        None
    }
}

fn text(mapping: &HashMap<String, String>, key: &str) -> Option<String> {
    mapping.get(key).cloned()
}
