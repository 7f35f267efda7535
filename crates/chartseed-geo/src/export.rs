//! GeoJSON export of box lists for inspection in GIS tools.

use chartseed_core::models::ZoomBox;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// Convert one box to a polygon feature carrying zoom, name and origin
pub fn to_feature(b: &ZoomBox) -> Feature {
    let (s, w) = (b.southwest.lat, b.southwest.lng);
    let (n, e) = (b.northeast.lat, b.northeast.lng);
    let ring = vec![vec![w, s], vec![e, s], vec![e, n], vec![w, n], vec![w, s]];

    let mut properties = JsonObject::new();
    properties.insert("zoom".to_string(), JsonValue::from(b.zoom));
    if let Some(ref name) = b.name {
        properties.insert("name".to_string(), JsonValue::from(name.as_str()));
    }
    properties.insert("synthetic".to_string(), JsonValue::from(b.synthetic));

    Feature {
        bbox: Some(vec![w, s, e, n]),
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Convert a box list to a feature collection
pub fn to_feature_collection(boxes: &[ZoomBox]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: boxes.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}
