use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::link::Link;
use crate::options::ConvertOptions;
use crate::timestamp::format_timestamp;
use crate::waypoint::Waypoint;

/// Convert waypoints to a GeoJSON FeatureCollection. Waypoints without a
/// full position are left out.
pub fn to_feature_collection(waypoints: &[Waypoint], opts: &ConvertOptions) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: waypoints
            .iter()
            .filter_map(|wpt| waypoint_to_feature(wpt, opts))
            .collect(),
        foreign_members: None,
    }
}

/// Point feature for a waypoint, or `None` when latitude or longitude is
/// unknown.
pub fn waypoint_to_feature(wpt: &Waypoint, opts: &ConvertOptions) -> Option<Feature> {
    let coords = point_coords(wpt, opts.include_elevation)?;
    let geometry = Geometry::new(Value::Point(coords));

    let mut props = Map::new();
    props.insert(
        "gpxType".to_string(),
        JsonValue::String("waypoint".to_string()),
    );

    if opts.include_metadata {
        insert_point_metadata(&mut props, wpt);
    }

    if opts.include_time {
        if let Some(ref time) = wpt.time {
            props.insert("time".to_string(), JsonValue::String(format_timestamp(time)));
        }
    }

    if opts.include_links {
        insert_links(&mut props, wpt.links());
    }

    Some(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    })
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn point_coords(wpt: &Waypoint, include_elevation: bool) -> Option<Vec<f64>> {
    let (lat, lon) = (wpt.latitude?, wpt.longitude?);
    Some(match (include_elevation, wpt.elevation) {
        (true, Some(ele)) => vec![lon, lat, ele],
        _ => vec![lon, lat],
    })
}

fn insert_point_metadata(props: &mut Map<String, JsonValue>, wpt: &Waypoint) {
    insert_optional(props, "name", &wpt.name);
    insert_optional(props, "cmt", &wpt.comment);
    insert_optional(props, "desc", &wpt.description);
    insert_optional(props, "src", &wpt.source);
    insert_optional(props, "sym", &wpt.symbol);
    insert_optional(props, "type", &wpt.waypoint_type);
    insert_number(props, "ele", wpt.elevation);
    insert_number(props, "magvar", wpt.magnetic_variation);
    insert_number(props, "geoidheight", wpt.geoid_height);
    insert_integer(props, "fix", wpt.fix);
    insert_integer(props, "sat", wpt.satellites);
    insert_number(props, "hdop", wpt.horizontal_dilution);
    insert_number(props, "vdop", wpt.vertical_dilution);
    insert_number(props, "pdop", wpt.position_dilution);
    insert_number(props, "ageofdgpsdata", wpt.age_of_dgps_data);
    insert_integer(props, "dgpsid", wpt.dgps_id);
}

fn insert_optional(props: &mut Map<String, JsonValue>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        props.insert(key.to_string(), JsonValue::String(v.clone()));
    }
}

/// Non-finite values have no JSON representation and are left out.
fn insert_number(props: &mut Map<String, JsonValue>, key: &str, value: Option<f64>) {
    if let Some(n) = value.and_then(serde_json::Number::from_f64) {
        props.insert(key.to_string(), JsonValue::Number(n));
    }
}

fn insert_integer(props: &mut Map<String, JsonValue>, key: &str, value: Option<i64>) {
    if let Some(n) = value {
        props.insert(key.to_string(), JsonValue::Number(n.into()));
    }
}

fn insert_links(props: &mut Map<String, JsonValue>, links: &[Link]) {
    if links.is_empty() {
        return;
    }
    let links = links
        .iter()
        .map(|link| {
            let mut link_obj = Map::new();
            link_obj.insert("href".to_string(), JsonValue::String(link.href.clone()));
            if let Some(ref t) = link.text {
                link_obj.insert("text".to_string(), JsonValue::String(t.clone()));
            }
            if let Some(ref lt) = link.mime_type {
                link_obj.insert("type".to_string(), JsonValue::String(lt.clone()));
            }
            JsonValue::Object(link_obj)
        })
        .collect();
    props.insert("links".to_string(), JsonValue::Array(links));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_waypoints;

    #[test]
    fn test_waypoint_conversion() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.6762" lon="139.6503">
    <ele>40.5</ele>
    <time>2025-01-01T12:00:00Z</time>
    <name>Tokyo</name>
    <sat>8</sat>
    <link href="https://example.com"><text>Example</text></link>
  </wpt>
</gpx>"#;
        let waypoints = parse_waypoints(xml).unwrap();
        let fc = to_feature_collection(&waypoints, &ConvertOptions::default());

        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        let geom = f.geometry.as_ref().unwrap();

        // Check [lon, lat, ele] order
        if let Value::Point(coords) = &geom.value {
            assert!((coords[0] - 139.6503).abs() < 1e-10); // lon
            assert!((coords[1] - 35.6762).abs() < 1e-10); // lat
            assert!((coords[2] - 40.5).abs() < 1e-10); // ele
        } else {
            panic!("Expected Point geometry");
        }

        let props = f.properties.as_ref().unwrap();
        assert_eq!(props["gpxType"], "waypoint");
        assert_eq!(props["name"], "Tokyo");
        assert_eq!(props["ele"], 40.5);
        assert_eq!(props["sat"], 8);
        assert_eq!(props["time"], "2025-01-01T12:00:00Z");
        assert_eq!(props["links"][0]["href"], "https://example.com");
        assert_eq!(props["links"][0]["text"], "Example");
    }

    #[test]
    fn test_missing_position_skipped() {
        let mut partial = Waypoint::new();
        partial.latitude = Some(10.0);
        let full = Waypoint::with_coordinates(10.0, 20.0);
        let fc = to_feature_collection(&[partial, full], &ConvertOptions::default());
        assert_eq!(fc.features.len(), 1);
    }

    #[test]
    fn test_options_strip_properties() {
        let mut wpt = Waypoint::with_coordinates(1.0, 2.0);
        wpt.elevation = Some(3.0);
        wpt.name = Some("Hidden".into());
        wpt.add_link(Link::new("https://example.com"));
        let opts = ConvertOptions {
            include_elevation: false,
            include_time: false,
            include_metadata: false,
            include_links: false,
        };

        let f = waypoint_to_feature(&wpt, &opts).unwrap();
        if let Value::Point(coords) = &f.geometry.as_ref().unwrap().value {
            assert_eq!(coords, &vec![2.0, 1.0]);
        } else {
            panic!("Expected Point geometry");
        }
        let props = f.properties.unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["gpxType"], "waypoint");
    }

    #[test]
    fn test_non_finite_numbers_omitted() {
        let mut wpt = Waypoint::with_coordinates(1.0, 2.0);
        wpt.horizontal_dilution = Some(f64::NAN);
        let f = waypoint_to_feature(&wpt, &ConvertOptions::default()).unwrap();
        assert!(!f.properties.unwrap().contains_key("hdop"));
    }
}
