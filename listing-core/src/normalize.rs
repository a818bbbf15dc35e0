//! Canonical Normalizer
//!
//! Pure functions that turn arbitrarily-shaped persisted data (JSON arrays,
//! JSON-encoded strings, bare objects, nulls, malformed legacy text) into
//! fully-defaulted canonical entities. Downstream code never needs
//! defensive null checks: every required field is filled with a
//! type-appropriate default and missing ids get a fresh UUID.
//!
//! Normalization is idempotent and has no side effects, so it is safe to
//! run on every read.

use serde_json::Value;
use uuid::Uuid;

use crate::model::{Area, Feature, Floorplan, Image, NearbyCity, NearbyPlace, TechnicalItem};

/// Coerce any supported input shape into a list of JSON objects
///
/// Accepted shapes: an array, a JSON-encoded string of an array, a single
/// object (wrapped into a one-element list), a JSON-encoded string of a
/// single object, null/absent, or a malformed string. Malformed input
/// yields an empty list; this function never fails.
pub fn coerce_list(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Object(_) => vec![raw.clone()],
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            Ok(parsed @ Value::Object(_)) => vec![parsed],
            Ok(_) | Err(_) => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Normalize any supported input shape into canonical entities
pub fn normalize<T, F>(raw: &Value, transform: F) -> Vec<T>
where
    F: Fn(&Value) -> T,
{
    coerce_list(raw).iter().map(transform).collect()
}

pub fn normalize_features(raw: &Value) -> Vec<Feature> {
    normalize(raw, Feature::from_value)
}

pub fn normalize_areas(raw: &Value) -> Vec<Area> {
    normalize(raw, Area::from_value)
}

pub fn normalize_floorplans(raw: &Value) -> Vec<Floorplan> {
    normalize(raw, Floorplan::from_value)
}

pub fn normalize_technical_items(raw: &Value) -> Vec<TechnicalItem> {
    normalize(raw, TechnicalItem::from_value)
}

pub fn normalize_nearby_places(raw: &Value) -> Vec<NearbyPlace> {
    normalize(raw, NearbyPlace::from_value)
}

pub fn normalize_nearby_cities(raw: &Value) -> Vec<NearbyCity> {
    normalize(raw, NearbyCity::from_value)
}

/// Normalize a gallery column: entries may be bare URL strings or records
pub fn normalize_images(raw: &Value) -> Vec<Image> {
    coerce_list(raw)
        .iter()
        .filter_map(ImageSource::parse)
        .map(ImageSource::into_image)
        .collect()
}

/// Normalize a column holding a plain list of URLs (featured/grid sets)
pub fn normalize_url_list(raw: &Value) -> Vec<String> {
    coerce_list(raw)
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Boundary shape of one gallery entry: legacy rows hold either a bare URL
/// string or a record. Parsed once on read; the rest of the system only
/// ever sees the [`Image`] record shape.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bare(String),
    Record {
        id: Option<String>,
        url: String,
        file_path: Option<String>,
    },
}

impl ImageSource {
    pub fn parse(value: &Value) -> Option<ImageSource> {
        match value {
            Value::String(url) => Some(ImageSource::Bare(url.clone())),
            Value::Object(_) => Some(ImageSource::Record {
                id: opt_text(value, &["id"]),
                url: text(value, &["url", "src"]),
                file_path: opt_text(value, &["file_path", "filePath"]),
            }),
            _ => None,
        }
    }

    pub fn into_image(self) -> Image {
        match self {
            ImageSource::Bare(url) => Image {
                id: new_id(),
                url,
                file_path: None,
            },
            ImageSource::Record { id, url, file_path } => Image {
                id: id.unwrap_or_else(new_id),
                url,
                file_path,
            },
        }
    }
}

impl Feature {
    pub fn from_value(value: &Value) -> Feature {
        Feature {
            id: id_of(value),
            description: text(value, &["description"]),
        }
    }
}

impl Image {
    pub fn from_value(value: &Value) -> Image {
        ImageSource::parse(value)
            .map(ImageSource::into_image)
            .unwrap_or_else(|| Image {
                id: new_id(),
                url: String::new(),
                file_path: None,
            })
    }
}

impl Area {
    pub fn from_value(value: &Value) -> Area {
        Area {
            id: id_of(value),
            title: text(value, &["title"]),
            name: text(value, &["name"]),
            description: text(value, &["description"]),
            size: text(value, &["size"]),
            columns: int_or(value, &["columns"], Area::DEFAULT_COLUMNS),
            image_ids: string_list(value, &["image_ids", "imageIds"]),
            images: value
                .get("images")
                .map(normalize_images)
                .unwrap_or_default(),
        }
    }
}

impl Floorplan {
    pub fn from_value(value: &Value) -> Floorplan {
        Floorplan {
            id: id_of(value),
            url: text(value, &["url", "src"]),
            file_path: opt_text(value, &["file_path", "filePath"]),
            columns: int_or(value, &["columns"], Floorplan::DEFAULT_COLUMNS),
        }
    }
}

impl TechnicalItem {
    pub fn from_value(value: &Value) -> TechnicalItem {
        TechnicalItem {
            id: id_of(value),
            title: text(value, &["title"]),
            value: text(value, &["value"]),
            floorplan_id: opt_text(value, &["floorplan_id", "floorplanId"]),
        }
    }
}

impl NearbyPlace {
    pub fn from_value(value: &Value) -> NearbyPlace {
        NearbyPlace {
            id: id_of(value),
            name: text(value, &["name"]),
            place_type: text(value, &["type", "place_type"]),
            vicinity: text(value, &["vicinity"]),
            rating: value.get("rating").and_then(Value::as_f64),
            distance: text(value, &["distance"]),
            visible_in_webview: bool_or(value, &["visible_in_webview", "visibleInWebview"], false),
        }
    }
}

impl NearbyCity {
    pub fn from_value(value: &Value) -> NearbyCity {
        NearbyCity {
            id: id_of(value),
            name: text(value, &["name"]),
            distance: text(value, &["distance"]),
            visible_in_webview: bool_or(value, &["visible_in_webview", "visibleInWebview"], false),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Entity id, minting a fresh UUID when absent or empty
fn id_of(value: &Value) -> String {
    match opt_text(value, &["id"]) {
        Some(id) if !id.is_empty() => id,
        _ => new_id(),
    }
}

/// First present string value among the given keys, else empty.
/// Numbers are stringified because legacy rows stored sizes/distances as
/// either strings or numbers.
fn text(value: &Value, keys: &[&str]) -> String {
    opt_text(value, keys).unwrap_or_default()
}

fn opt_text(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

fn int_or(value: &Value, keys: &[&str], default: i64) -> i64 {
    for key in keys {
        if let Some(v) = value.get(key) {
            if let Some(n) = v.as_i64() {
                return n;
            }
            if let Some(s) = v.as_str() {
                if let Ok(n) = s.parse::<i64>() {
                    return n;
                }
            }
        }
    }
    default
}

fn bool_or(value: &Value, keys: &[&str], default: bool) -> bool {
    for key in keys {
        if let Some(b) = value.get(key).and_then(Value::as_bool) {
            return b;
        }
    }
    default
}

fn string_list(value: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        if let Some(Value::Array(items)) = value.get(key) {
            return items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn features_from_json_string() {
        let raw = json!(r#"[{"id":"a1","description":"Pool"}]"#);
        let features = normalize_features(&raw);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "a1");
        assert_eq!(features[0].description, "Pool");
    }

    #[test]
    fn malformed_string_yields_empty() {
        let areas = normalize_areas(&json!("not json"));
        assert!(areas.is_empty());
    }

    #[test]
    fn null_and_absent_yield_empty() {
        assert!(normalize_features(&Value::Null).is_empty());
        assert!(normalize_images(&Value::Null).is_empty());
        assert!(normalize_url_list(&Value::Null).is_empty());
    }

    #[test]
    fn single_object_is_wrapped() {
        let features = normalize_features(&json!({"id": "f1", "description": "Garage"}));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].description, "Garage");
    }

    #[test]
    fn json_string_of_single_object_is_wrapped() {
        let features = normalize_features(&json!(r#"{"id":"f1","description":"Garage"}"#));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "f1");
    }

    #[test]
    fn missing_fields_get_defaults() {
        let areas = normalize_areas(&json!([{}]));
        assert_eq!(areas.len(), 1);
        let area = &areas[0];
        assert!(!area.id.is_empty());
        assert_eq!(area.title, "");
        assert_eq!(area.columns, Area::DEFAULT_COLUMNS);
        assert!(area.image_ids.is_empty());
        assert!(area.images.is_empty());
    }

    #[test]
    fn area_accepts_camel_case_legacy_keys() {
        let areas = normalize_areas(&json!([{
            "id": "ar1",
            "imageIds": ["i1"],
            "images": [{"id": "i1", "url": "https://cdn/x.jpg", "filePath": "p/x.jpg"}],
        }]));
        assert_eq!(areas[0].image_ids, vec!["i1"]);
        assert_eq!(areas[0].images[0].file_path.as_deref(), Some("p/x.jpg"));
    }

    #[test]
    fn bare_url_strings_become_image_records() {
        let images = normalize_images(&json!(["https://cdn/a.jpg", {"id": "i2", "url": "https://cdn/b.jpg"}]));
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://cdn/a.jpg");
        assert!(!images[0].id.is_empty());
        assert!(images[0].file_path.is_none());
        assert_eq!(images[1].id, "i2");
    }

    #[test]
    fn numeric_size_is_stringified() {
        let areas = normalize_areas(&json!([{"id": "a", "size": 42}]));
        assert_eq!(areas[0].size, "42");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!([
            {"description": "Pool"},
            {"id": "f2", "description": "Sauna"},
        ]);
        let once = normalize_features(&raw);
        let round_tripped = serde_json::to_value(&once).unwrap();
        let twice = normalize_features(&round_tripped);
        assert_eq!(once, twice);

        let raw_images = json!(["https://cdn/a.jpg"]);
        let once = normalize_images(&raw_images);
        let twice = normalize_images(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn technical_item_floorplan_reference_survives() {
        let items = normalize_technical_items(&json!([
            {"id": "t1", "title": "Area", "value": "120", "floorplanId": "fp1"}
        ]));
        assert_eq!(items[0].floorplan_id.as_deref(), Some("fp1"));
    }

    #[test]
    fn nearby_place_defaults() {
        let places = normalize_nearby_places(&json!([{"name": "Cafe", "type": "cafe"}]));
        assert_eq!(places[0].name, "Cafe");
        assert_eq!(places[0].place_type, "cafe");
        assert!(places[0].rating.is_none());
        assert!(!places[0].visible_in_webview);
    }
}
