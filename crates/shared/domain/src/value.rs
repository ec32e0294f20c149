use serde::{Deserialize, Serialize};

/// A 3D point in host model units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Version-independent value representation that crosses the adapter boundary.
///
/// Adapters convert host-native values into this shape and back. Identifiers are always 64-bit
/// here; narrowing to a 32-bit host identifier is the adapter's job and fails loudly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    ElementId(i64),
    Point(Point3),
    /// A unit identifier such as `"autodesk.unit.unit:meters-1.0.1"` or `"meters"`.
    Unit(String),
    List(Vec<Value>),
}

impl Value {
    /// Short type label used in conversion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::ElementId(_) => "elementId",
            Self::Point(_) => "point",
            Self::Unit(_) => "unit",
            Self::List(_) => "list",
        }
    }

    #[must_use]
    pub const fn as_element_id(&self) -> Option<i64> {
        match self {
            Self::ElementId(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_is_tagged() {
        let value = Value::ElementId(42);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "elementId", "value": 42 }));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn point_nests_inside_value() {
        let json = serde_json::to_value(Value::Point(Point3::new(1.0, 2.0, 3.0))).unwrap();
        assert_eq!(json["value"]["y"], 2.0);
    }
}
