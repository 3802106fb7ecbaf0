use std::collections::HashMap;

use chrono::{Datelike, Timelike};
use gpx_waypoint::converter::to_feature_collection;
use gpx_waypoint::encoder::{encode, encode_with};
use gpx_waypoint::reader::parse_waypoints;
use gpx_waypoint::timestamp::parse_timestamp;
use gpx_waypoint::{ConvertOptions, EncodeOptions, LineEnding, Link, TagNames, Waypoint};

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Route debug output of coercion misses to the test harness.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn lf() -> EncodeOptions {
    EncodeOptions {
        line_ending: LineEnding::Lf,
        ..Default::default()
    }
}

fn attribute<'a>(gpx: &'a str, name: &str) -> &'a str {
    let start = gpx.find(&format!("{name}=\"")).unwrap() + name.len() + 2;
    let end = start + gpx[start..].find('"').unwrap();
    &gpx[start..end]
}

#[test]
fn test_lat_lon_round_trip_six_decimals() {
    let cases = [
        ("45.123456", "-122.654321"),
        ("0", "0"),
        ("-89.9999994", "179.9999996"),
        ("1e-3", "12.3456789"),
        ("35.6762", "139.6503"),
    ];
    for (lat, lon) in cases {
        let wpt = Waypoint::from_mapping(&mapping(&[("lat", lat), ("lon", lon)]));
        let mut gpx = String::new();
        encode(&wpt, &mut gpx, 0);

        let lat_out: f64 = attribute(&gpx, "lat").parse().unwrap();
        let lon_out: f64 = attribute(&gpx, "lon").parse().unwrap();
        assert!((lat_out - lat.parse::<f64>().unwrap()).abs() <= 5e-7, "{lat} -> {lat_out}");
        assert!((lon_out - lon.parse::<f64>().unwrap()).abs() <= 5e-7, "{lon} -> {lon_out}");
        assert_eq!(attribute(&gpx, "lat").split('.').nth(1).unwrap().len(), 6);
    }
}

#[test]
fn test_empty_mapping_versus_new() {
    let decoded = Waypoint::from_mapping(&HashMap::new());
    assert!(decoded.time.is_none());
    assert!(decoded.latitude.is_none());
    assert!(decoded.longitude.is_none());
    assert!(decoded.elevation.is_none());
    assert!(decoded.comment.is_none());
    assert!(decoded.satellites.is_none());
    assert!(decoded.age_of_dgps_data.is_none());

    let fresh = Waypoint::new();
    assert!(fresh.time.is_some());
}

#[test]
fn test_parse_reference_timestamp() {
    let t = parse_timestamp(Some("2020-05-01T12:30:45Z")).unwrap();
    assert_eq!(
        (t.year(), t.month(), t.day(), t.hour(), t.minute(), t.second()),
        (2020, 5, 1, 12, 30, 45)
    );
    assert_eq!(t.timezone(), chrono::Utc);
}

#[test]
fn test_link_add_twice_then_remove() {
    let mut wpt = Waypoint::new();
    let link = wpt.new_link("https://example.com");
    wpt.add_link(link.clone());
    wpt.add_link(link.clone());
    assert_eq!(wpt.links().len(), 1);

    let removed = wpt.remove_link(&link).unwrap();
    assert!(wpt.links().is_empty());
    assert!(removed.parent().is_none());
}

#[test]
fn test_coordinates_only_has_no_children() {
    let wpt = Waypoint::from_mapping(&mapping(&[("lat", "45.123456"), ("lon", "-122.654321")]));
    let mut gpx = String::new();
    encode(&wpt, &mut gpx, 0);
    assert_eq!(gpx, "<wpt lat=\"45.123456\" lon=\"-122.654321\">\r\n</wpt>\r\n");
}

#[test]
fn test_unparsable_elevation_is_absent() {
    init_tracing();
    for bad in ["abc", "", "1,5", "--1"] {
        let wpt = Waypoint::from_mapping(&mapping(&[("ele", bad), ("lat", "1")]));
        assert!(wpt.elevation.is_none(), "{bad:?}");
        assert_eq!(wpt.latitude, Some(1.0));
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let gpx = load_fixture("basic/01_full_waypoint.gpx");
    let waypoints = parse_waypoints(&gpx).unwrap();
    let render = || {
        let mut out = String::new();
        for wpt in &waypoints {
            encode(wpt, &mut out, 1);
        }
        out
    };
    assert_eq!(render(), render());
}

#[test]
fn test_full_waypoint_fixture() {
    let waypoints = parse_waypoints(&load_fixture("basic/01_full_waypoint.gpx")).unwrap();
    assert_eq!(waypoints.len(), 2);

    let wpt = &waypoints[0];
    assert_eq!(wpt.name.as_deref(), Some("Tokyo Tower"));
    assert_eq!(wpt.comment.as_deref(), Some("A comment"));
    assert_eq!(wpt.source.as_deref(), Some("GPS"));
    assert_eq!(wpt.symbol.as_deref(), Some("Flag, Blue"));
    assert_eq!(wpt.fix, Some(3));
    assert_eq!(wpt.satellites, Some(9));
    assert_eq!(wpt.dgps_id, Some(112));
    assert_eq!(wpt.age_of_dgps_data, Some(2.5));
    assert_eq!(wpt.links().len(), 1);
    assert_eq!(wpt.links()[0].text.as_deref(), Some("Tokyo Tower Website"));
    assert_eq!(wpt.links()[0].parent(), Some(wpt.id()));
    let ext = wpt.extensions.as_ref().unwrap();
    assert_eq!(
        ext.find("gpxx:DisplayMode").and_then(|e| e.text.as_deref()),
        Some("SymbolAndName")
    );

    let bare = &waypoints[1];
    assert!(bare.time.is_none());
    assert!(bare.name.is_none());
}

#[test]
fn test_mixed_document_fixture() {
    init_tracing();
    let waypoints = parse_waypoints(&load_fixture("basic/02_mixed_document.gpx")).unwrap();
    assert_eq!(waypoints.len(), 3);

    assert_eq!(waypoints[0].time.unwrap().hour(), 6);

    let summit = &waypoints[1];
    assert!(summit.elevation.is_none());
    assert!(summit.time.is_none());
    assert!(summit.satellites.is_none());
    assert_eq!(summit.name.as_deref(), Some("Summit & Lookout"));
    assert_eq!(summit.links().len(), 1);

    assert!(waypoints[2].latitude.is_none());
}

#[test]
fn test_legacy_layout() {
    let wpt = Waypoint::from_mapping(&mapping(&[
        ("name", "Camp"),
        ("cmt", "dropped in legacy output"),
        ("src", "Garmin"),
        ("fix", "3"),
        ("sat", "6"),
    ]));
    let opts = EncodeOptions {
        tag_names: TagNames::Legacy,
        ..Default::default()
    };
    let mut gpx = String::new();
    encode_with(&wpt, &mut gpx, 0, &opts);
    assert_eq!(
        gpx,
        "<wpt>\r\n\t<name>Camp</name>\r\n\t<source>Garmin</source>\r\n\t<source>3</source>\r\n\t<sat>6</sat>\r\n</wpt>\r\n"
    );
}

#[test]
fn test_decode_encode_decode_preserves_fields() {
    let original = Waypoint::from_mapping(&mapping(&[
        ("lat", "12.5"),
        ("lon", "-3.25"),
        ("ele", "100"),
        ("time", "2024-02-29T23:59:59Z"),
        ("name", "R&D <lab>"),
        ("hdop", "1.5"),
        ("dgpsid", "42"),
    ]));
    let mut gpx = String::from("<gpx version=\"1.1\">\n");
    encode_with(&original, &mut gpx, 1, &lf());
    gpx.push_str("</gpx>\n");

    let reparsed = parse_waypoints(&gpx).unwrap();
    let wpt = &reparsed[0];
    assert_eq!(wpt.latitude, Some(12.5));
    assert_eq!(wpt.longitude, Some(-3.25));
    assert_eq!(wpt.elevation, Some(100.0));
    assert_eq!(wpt.time, original.time);
    assert_eq!(wpt.name.as_deref(), Some("R&D <lab>"));
    assert_eq!(wpt.horizontal_dilution, Some(1.5));
    assert_eq!(wpt.dgps_id, Some(42));
}

#[test]
fn test_geojson_from_fixture() {
    let waypoints = parse_waypoints(&load_fixture("basic/02_mixed_document.gpx")).unwrap();
    let fc = to_feature_collection(&waypoints, &ConvertOptions::default());
    assert_eq!(fc.features.len(), 2);
    let props = fc.features[1].properties.as_ref().unwrap();
    assert_eq!(props["name"], "Summit & Lookout");
    assert_eq!(props["links"].as_array().unwrap().len(), 1);
}

#[test]
fn test_links_attached_by_hand_are_encoded_in_order() {
    let mut wpt = Waypoint::from_mapping(&HashMap::new());
    wpt.add_links([
        Link::new("https://a.example").with_type("text/html"),
        Link::new("https://b.example"),
    ]);
    wpt.symbol = Some("Pin".into());
    let mut gpx = String::new();
    encode_with(&wpt, &mut gpx, 0, &lf());
    assert_eq!(
        gpx,
        "<wpt>\n\t<link href=\"https://a.example\">\n\t\t<type>text/html</type>\n\t</link>\n\t<link href=\"https://b.example\">\n\t</link>\n\t<sym>Pin</sym>\n</wpt>\n"
    );
}
