//! Option map normalization.
//!
//! Turns an ordered option map into `(key, rendered value)` pairs ready to
//! be written as object-literal fields.
//!
//! Rendering rules:
//! - null renders as an empty object literal `{}`
//! - booleans and numbers render as literals
//! - strings are JSON-encoded, unless the key names an enumerated option, in
//!   which case the value is upper-cased and namespaced
//!   (`position: "left"` becomes `google.maps.ControlPosition.LEFT`)
//! - objects of exactly `{lat, lng}` become point constructors
//! - other arrays and objects are rendered recursively

use serde_json::Value;

use crate::types::{Coordinate, Options};

/// Prefix of every widget API reference.
pub const API_NAMESPACE: &str = "google.maps";

/// Renders option values into script expressions.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Option key -> enum namespace under `google.maps`.
    enums: Vec<(String, String)>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            enums: vec![
                ("position".to_string(), "ControlPosition".to_string()),
                ("animation".to_string(), "Animation".to_string()),
                ("mapTypeId".to_string(), "MapTypeId".to_string()),
                ("travelMode".to_string(), "DirectionsTravelMode".to_string()),
                ("unitSystem".to_string(), "DirectionsUnitSystem".to_string()),
            ],
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn enum_namespace(&self, key: &str) -> Option<&str> {
        self.enums
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, ns)| ns.as_str())
    }

    /// Flatten an option map into ordered `(key, rendered value)` pairs.
    pub fn normalize(&self, options: &Options) -> Vec<(String, String)> {
        options
            .iter()
            .map(|(key, value)| (key.clone(), self.render_field(key, value)))
            .collect()
    }

    /// Render the value of a named option.
    pub fn render_field(&self, key: &str, value: &Value) -> String {
        match (self.enum_namespace(key), value) {
            (Some(namespace), Value::String(member)) => enum_literal(namespace, member),
            _ => self.render_value(value),
        }
    }

    /// Render a value with no key context.
    pub fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "{}".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => encode_string(s),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| self.render_value(v)).collect();
                format!("[{}]", items.join(","))
            }
            Value::Object(map) => match as_coordinate(map) {
                Some(coord) => coord.to_js(),
                None => self.render_object(map),
            },
        }
    }

    /// Render an option map as a single-line object literal.
    pub fn render_object(&self, options: &Options) -> String {
        let fields: Vec<String> = options
            .iter()
            .map(|(key, value)| format!("{}:{}", encode_string(key), self.render_field(key, value)))
            .collect();
        format!("{{{}}}", fields.join(","))
    }
}

/// Render an enumerated widget constant: `google.maps.<Namespace>.<MEMBER>`.
///
/// Values that already name a widget constant pass through unchanged.
pub fn enum_literal(namespace: &str, member: &str) -> String {
    if member.starts_with(API_NAMESPACE) {
        return member.to_string();
    }
    format!("{}.{}.{}", API_NAMESPACE, namespace, member.to_uppercase())
}

/// JSON-encode a string as a script string literal.
///
/// `</` is written as `<\/` so the literal cannot close an enclosing
/// `<script>` element.
pub fn encode_string(s: &str) -> String {
    Value::String(s.to_string()).to_string().replace("</", "<\\/")
}

/// Objects holding exactly numeric `lat` and `lng` are coordinate pairs.
fn as_coordinate(map: &Options) -> Option<Coordinate> {
    if map.len() != 2 {
        return None;
    }
    let lat = map.get("lat")?.as_f64()?;
    let lng = map.get("lng")?.as_f64()?;
    Coordinate::new(lat, lng).ok()
}
