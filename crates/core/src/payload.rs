//! Payload: the validated inbound event envelope.
//!
//! Every pipeline run is driven by exactly one payload. Payloads are
//! validated at the boundary (`Payload::from_json`) and are immutable
//! afterwards: fields are private and only exposed through accessors.

use serde::Serialize;
use serde_json::{Map, Value};
use crate::error::PayloadError;

/// An inbound event: `{ "type", "action", "userId", "data" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(rename = "type")]
    kind: String,

    action: String,

    #[serde(rename = "userId")]
    user_id: String,

    data: Map<String, Value>,
}

impl Payload {
    /// Construct a payload from already-validated parts.
    pub fn new(
        kind: impl Into<String>,
        action: impl Into<String>,
        user_id: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            kind: kind.into(),
            action: action.into(),
            user_id: user_id.into(),
            data,
        }
    }

    /// Parse and validate a raw JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate a decoded JSON value against the payload schema.
    ///
    /// `type`, `action` and `userId` must be strings. `data` is optional;
    /// absent or `null` means an empty mapping. Extra fields are ignored.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut obj) = value else {
            return Err(PayloadError::InvalidJson(
                "payload must be a JSON object".into(),
            ));
        };

        let kind = take_string(&mut obj, "type")?;
        let action = take_string(&mut obj, "action")?;
        let user_id = take_string(&mut obj, "userId")?;

        let data = match obj.remove("data") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(PayloadError::InvalidField {
                    field: "data",
                    reason: format!("expected an object, got {}", json_type_name(&other)),
                });
            }
        };

        Ok(Self {
            kind,
            action,
            user_id,
            data,
        })
    }

    /// The category tag (`type` on the wire).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The sub-type tag.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The subject identifier (`userId` on the wire).
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The open data mapping. May be empty, never absent.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Pretty-printed wire representation, as embedded in prompts.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn take_string(obj: &mut Map<String, Value>, field: &'static str) -> Result<String, PayloadError> {
    match obj.remove(field) {
        None | Some(Value::Null) => Err(PayloadError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(PayloadError::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_type_name(&other)),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_payload() {
        let payload = Payload::from_json(
            r#"{"type":"EVENT","action":"AIR_TRACK_UPDATE","userId":"u1","data":{"trackId":"T-7"}}"#,
        )
        .unwrap();
        assert_eq!(payload.kind(), "EVENT");
        assert_eq!(payload.action(), "AIR_TRACK_UPDATE");
        assert_eq!(payload.user_id(), "u1");
        assert_eq!(payload.data()["trackId"], "T-7");
    }

    #[test]
    fn data_defaults_to_empty() {
        let payload = Payload::from_json(r#"{"type":"EVENT","action":"X","userId":"u1"}"#).unwrap();
        assert!(payload.data().is_empty());

        let payload =
            Payload::from_json(r#"{"type":"EVENT","action":"X","userId":"u1","data":null}"#).unwrap();
        assert!(payload.data().is_empty());
    }

    #[test]
    fn missing_user_id_rejected() {
        let err = Payload::from_json(r#"{"type":"EVENT","action":"X"}"#).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("userId"));
    }

    #[test]
    fn null_required_field_rejected() {
        let err = Payload::from_json(r#"{"type":null,"action":"X","userId":"u1"}"#).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("type"));
    }

    #[test]
    fn non_string_action_rejected() {
        let err = Payload::from_json(r#"{"type":"EVENT","action":42,"userId":"u1"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidField { field: "action", .. }));
    }

    #[test]
    fn non_object_data_rejected() {
        let err =
            Payload::from_json(r#"{"type":"EVENT","action":"X","userId":"u1","data":[1,2]}"#)
                .unwrap_err();
        assert!(matches!(err, PayloadError::InvalidField { field: "data", .. }));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = Payload::from_json("{not json").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidJson(_)));

        let err = Payload::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidJson(_)));
    }

    #[test]
    fn extra_fields_ignored() {
        let payload = Payload::from_json(
            r#"{"type":"EVENT","action":"X","userId":"u1","correlationId":"c-9"}"#,
        )
        .unwrap();
        assert_eq!(payload.user_id(), "u1");
    }

    #[test]
    fn serializes_with_wire_names() {
        let payload = Payload::new("EVENT", "X", "u1", Map::new());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "EVENT");
        assert_eq!(json["userId"], "u1");
        assert!(json["data"].is_object());
        assert!(payload.to_json_pretty().contains("\"userId\": \"u1\""));
    }
}
