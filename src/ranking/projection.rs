use serde_json::{Map, Value};

use crate::store::{CompanyRecord, CompanyView, REFERENCE_FIELDS, RESERVED_FIELDS};

impl CompanyView {
    /// Caller-safe view of `record`.
    ///
    /// Drops the embedding and cached list; renders reference fields with
    /// [`canonical_string`]; passes other auxiliary fields through.
    pub fn project(record: &CompanyRecord) -> Self {
        let auxiliary: Map<String, Value> = record
            .auxiliary
            .iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| {
                let value = if REFERENCE_FIELDS.contains(&key.as_str()) {
                    canonical_string(value)
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect();

        Self {
            company_name: record.identifier.clone(),
            company_profile: record.profile_text.clone(),
            business_keywords: record.business_keywords.clone(),
            gives: record.gives,
            top10_customers: record.top10_customers,
            auxiliary,
        }
    }
}

/// Renders an opaque reference value as a string.
///
/// - strings pass through
/// - `{"$oid": "..."}` becomes the bare id
/// - numbers and booleans use their JSON text
/// - other objects and arrays become compact JSON
/// - `null` stays `null` (an absent reference is not the string `"null"`)
pub fn canonical_string(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(_) => value.clone(),
        Value::Object(map) => match (map.len(), map.get("$oid")) {
            (1, Some(Value::String(oid))) => Value::String(oid.clone()),
            _ => Value::String(value.to_string()),
        },
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(_) => Value::String(value.to_string()),
    }
}
