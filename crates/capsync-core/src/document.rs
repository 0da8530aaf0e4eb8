use serde_json::{Map, Value};

use crate::error::InvalidDocumentError;

/// Reserved field used as the reconciliation key.
pub const DISPLAY_NAME_FIELD: &str = "displayName";
/// Enforcement state; carried through untouched.
pub const STATE_FIELD: &str = "state";

/// A parsed policy. Only `displayName` and `state` are interpreted; every
/// other field is passed through as is, in template order.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    display_name: String,
    body: Map<String, Value>,
}

impl PolicyDocument {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> Option<&str> {
        self.body.get(STATE_FIELD).and_then(Value::as_str)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl TryFrom<Value> for PolicyDocument {
    type Error = InvalidDocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let body = match value {
            Value::Object(map) => map,
            other => return Err(InvalidDocumentError::NotAnObject(kind_of(&other))),
        };
        let display_name = body
            .get(DISPLAY_NAME_FIELD)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or(InvalidDocumentError::MissingDisplayName)?
            .to_string();
        Ok(Self { display_name, body })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses resolved template text into a [`PolicyDocument`].
pub fn validate(text: &str) -> Result<PolicyDocument, InvalidDocumentError> {
    let value: Value = serde_json::from_str(text)?;
    PolicyDocument::try_from(value)
}

/// Turns a document into the request body sent to the remote service.
pub trait DocumentSerializer {
    fn serialize(&self, doc: &PolicyDocument) -> String;
}

/// JSON wire format, compact by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    pub pretty: bool,
}

impl DocumentSerializer for JsonSerializer {
    fn serialize(&self, doc: &PolicyDocument) -> String {
        let value = Value::Object(doc.body.clone());
        if self.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_nested_document() {
        let doc = validate(
            r#"{"displayName":"Block legacy auth","state":"enabledForReportingButNotEnforced",
                "conditions":{"clientAppTypes":["exchangeActiveSync","other"],"users":{"includeUsers":["All"]}},
                "grantControls":{"operator":"OR","builtInControls":["block"]}}"#,
        )
        .unwrap();

        assert_eq!(doc.display_name(), "Block legacy auth");
        assert_eq!(doc.state(), Some("enabledForReportingButNotEnforced"));
        assert_eq!(
            doc.body()["conditions"]["clientAppTypes"],
            json!(["exchangeActiveSync", "other"])
        );
    }

    #[test]
    fn rejects_malformed_json_with_cause() {
        let err = validate(r#"{"displayName": "x",}"#).unwrap_err();
        assert!(matches!(err, InvalidDocumentError::Parse(_)));
        assert!(err.to_string().starts_with("Malformed JSON"));
    }

    #[test]
    fn rejects_unresolved_placeholder_outside_string() {
        let err = validate(r#"{"displayName":"x","sessionControls":<SESSION>}"#).unwrap_err();
        assert!(matches!(err, InvalidDocumentError::Parse(_)));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = validate(r#"[{"displayName":"x"}]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document root must be a JSON object, found an array"
        );
    }

    #[test]
    fn rejects_missing_or_blank_display_name() {
        for text in [
            r#"{"state":"enabled"}"#,
            r#"{"displayName":""}"#,
            r#"{"displayName":"   "}"#,
            r#"{"displayName":42}"#,
        ] {
            let err = validate(text).unwrap_err();
            assert!(
                matches!(err, InvalidDocumentError::MissingDisplayName),
                "{text}"
            );
        }
    }

    #[test]
    fn serializer_preserves_field_order() {
        let doc = validate(r#"{"state":"disabled","displayName":"Z","conditions":{}}"#).unwrap();
        let body = JsonSerializer::default().serialize(&doc);
        assert_eq!(body, r#"{"state":"disabled","displayName":"Z","conditions":{}}"#);

        let pretty = JsonSerializer { pretty: true }.serialize(&doc);
        assert!(pretty.contains("\n  \"displayName\": \"Z\""));
    }
}
