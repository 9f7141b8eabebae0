use serde::Serialize;
use serde_json::{Map, Value};

/// Field that every record must carry; it selects the log group.
pub const SERVICE_NAME: &str = "service_name";
/// Optional field selecting the log stream and headlining alerts.
pub const CLIENT_NAME: &str = "client_name";
/// Optional severity field, compared case-insensitively.
pub const LEVEL: &str = "level";

/// A single structured log event sent by a client service.
///
/// Fields keep the order in which they appeared in the incoming JSON
/// object, so formatting and serialization are deterministic for a given
/// request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    /// Parse a request body into a record.
    ///
    /// Anything that is not a JSON object (including valid JSON arrays or
    /// scalars) is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_slice(body)?;
        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// `service_name`, only when it is a non-empty string.
    pub fn service_name(&self) -> Option<&str> {
        match self.fields.get(SERVICE_NAME) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Display text of `client_name`, only when the value is truthy.
    pub fn client_name(&self) -> Option<String> {
        self.fields
            .get(CLIENT_NAME)
            .filter(|v| is_truthy(v))
            .map(display_value)
    }

    /// Compact JSON text used as the stored log message.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }
}

/// Whether a field value counts as "present" for routing and formatting.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Human-readable text for a field value: strings verbatim, anything else
/// as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_field_order() {
        let record = LogRecord::from_slice(br#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let keys: Vec<_> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(record.to_json().unwrap(), r#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn rejects_non_objects() {
        assert!(LogRecord::from_slice(b"[1,2]").is_err());
        assert!(LogRecord::from_slice(b"\"text\"").is_err());
        assert!(LogRecord::from_slice(b"not json").is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-3)));
        assert!(is_truthy(&json!({"os": "linux"})));
    }

    #[test]
    fn service_name_must_be_non_empty_string() {
        let mut record = LogRecord::default();
        assert_eq!(record.service_name(), None);
        record.insert(SERVICE_NAME, 7);
        assert_eq!(record.service_name(), None);
        record.insert(SERVICE_NAME, "");
        assert_eq!(record.service_name(), None);
        record.insert(SERVICE_NAME, "billing");
        assert_eq!(record.service_name(), Some("billing"));
    }

    #[test]
    fn client_name_uses_display_text() {
        let mut record = LogRecord::default();
        record.insert(CLIENT_NAME, 42);
        assert_eq!(record.client_name().as_deref(), Some("42"));
        record.insert(CLIENT_NAME, "");
        assert_eq!(record.client_name(), None);
    }
}
