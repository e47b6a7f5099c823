//! Base property rendering

use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::node::format_date;
use crate::domain::{Node, Property, PropertyValue, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Number, Value as JsonValue};

/// Renders every property value; enabled by default
pub struct PropertiesProcessor;

impl JsonProcessor for PropertiesProcessor {
    fn name(&self) -> &str {
        "properties"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_enabled_by_default(&self, _root: &Node) -> bool {
        true
    }

    fn process_property(
        &self,
        _node: &Node,
        property: &Property,
        input: Option<JsonValue>,
        _context: &SerializationContext<'_>,
    ) -> Option<JsonValue> {
        if input.is_some() {
            return input;
        }
        Some(render_property(property))
    }
}

/// JSON form of a property, arrays for multi-valued ones
pub fn render_property(property: &Property) -> JsonValue {
    match &property.value {
        PropertyValue::Single(value) => render_value(value),
        PropertyValue::Multiple(values) => {
            JsonValue::Array(values.iter().map(render_value).collect())
        }
    }
}

/// JSON form of a single value
pub fn render_value(value: &Value) -> JsonValue {
    match value {
        Value::String(s) | Value::Decimal(s) | Value::Reference(s) | Value::Path(s) => {
            JsonValue::String(s.clone())
        }
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Long(n) => JsonValue::Number((*n).into()),
        Value::Double(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
        Value::Date(d) => JsonValue::String(format_date(d)),
        Value::Binary(bytes) => JsonValue::String(BASE64.encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn test_render_values() {
        assert_eq!(render_value(&Value::Long(7)), json!(7));
        assert_eq!(render_value(&Value::Double(f64::NAN)), JsonValue::Null);
        assert_eq!(render_value(&Value::Binary(b"hi".to_vec())), json!("aGk="));
        let date = DateTime::parse_from_rfc3339("2024-05-10T08:00:00Z").unwrap();
        assert_eq!(
            render_value(&Value::Date(date)),
            json!("2024-05-10T08:00:00.000+00:00")
        );
    }

    #[test]
    fn test_render_multi_valued() {
        let property = Property::multiple("tags", vec![Value::String("a".into()), Value::Boolean(false)]);
        assert_eq!(render_property(&property), json!(["a", false]));
    }
}
