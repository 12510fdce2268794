//! The opaque policy document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PolicyError;

/// A parsed IAM policy document.
///
/// The content is kept as an untyped JSON object. Keys serialize in sorted
/// order, so two loads of the same file always produce identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument(Map<String, Value>);

impl PolicyDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    /// Returns [`PolicyError::PolicyDocumentInvalid`] if the text is not JSON
    /// or its top level is not an object.
    pub fn parse(name: &str, text: &str) -> Result<Self, PolicyError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| PolicyError::PolicyDocumentInvalid {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
        Self::from_value(name, value)
    }

    /// Wrap an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns [`PolicyError::PolicyDocumentInvalid`] if the value is not an
    /// object.
    pub fn from_value(name: &str, value: Value) -> Result<Self, PolicyError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PolicyError::PolicyDocumentInvalid {
                name: name.to_owned(),
                reason: format!("expected a JSON object, found {}", json_type(&other)),
            }),
        }
    }

    /// The document as a JSON object.
    #[must_use]
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a plain JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Number of non-whitespace characters in the compact serialization.
    ///
    /// This is the figure the identity service compares against the managed
    /// policy size limit.
    #[must_use]
    pub fn character_count(&self) -> usize {
        Value::Object(self.0.clone())
            .to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .count()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
