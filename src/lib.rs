pub mod converter;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extensions;
pub mod link;
pub mod options;
pub mod reader;
pub mod timestamp;
pub mod waypoint;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub use crate::error::GpxWaypointError;
pub use crate::extensions::{ExtensionElement, Extensions};
pub use crate::link::Link;
pub use crate::options::{ConvertOptions, EncodeOptions, LineEnding, TagNames};
pub use crate::waypoint::{Waypoint, WaypointId};

/// Decode a `{ tag: text }` object into a waypoint and return it as a
/// GPX `<wpt>` element string.
#[wasm_bindgen(js_name = waypointToGpx)]
pub fn waypoint_to_gpx(fields: JsValue, options: JsValue, indent_level: usize) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let fields: HashMap<String, String> =
        serde_wasm_bindgen::from_value(fields).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let opts: EncodeOptions = parse_options(options)?;

    let wpt = Waypoint::from_mapping(&fields);
    let mut gpx = String::new();
    encoder::encode_with(&wpt, &mut gpx, indent_level, &opts);
    Ok(gpx)
}

/// Parse the top-level waypoints of a GPX string, returned as JS objects.
#[wasm_bindgen(js_name = parseGpxWaypoints)]
pub fn parse_gpx_waypoints(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let waypoints = reader::parse_waypoints(gpx_string)?;
    serde_wasm_bindgen::to_value(&waypoints).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert the waypoints of a GPX string to GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = waypointsToGeoJson)]
pub fn waypoints_to_geojson(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts: ConvertOptions = parse_options(options)?;
    let waypoints = reader::parse_waypoints(gpx_string)?;
    let fc = converter::to_feature_collection(&waypoints, &opts);
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_options<T: DeserializeOwned + Default>(options: JsValue) -> Result<T, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| GpxWaypointError::InvalidOptions(e.to_string()).into())
    }
}
